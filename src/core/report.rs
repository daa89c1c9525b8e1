use super::types::{MILLION, Projection, ScenarioParameters};

pub const BAU_LABEL: &str = "BAU (No Action)";

pub fn strategy_label(params: &ScenarioParameters) -> String {
    format!("Strategy (${:.2}M/year + demo)", params.annual_investment)
}

/// Strategic summary bullets for a finished projection, in display order.
pub fn summary_lines(projection: &Projection) -> Vec<String> {
    let summary = &projection.summary;
    let mut lines = Vec::with_capacity(3 + summary.caveats.len());

    let horizon_end = summary
        .final_year
        .map(|year| format!("By {year}"))
        .unwrap_or_else(|| "At the start of the horizon".to_string());
    lines.push(format!(
        "{horizon_end}, DM would be ${}M under your strategy.",
        format_millions(summary.final_strategy_value, 0)
    ));
    lines.push(format!(
        "This avoids approximately ${}M compared to doing nothing.",
        format_millions(summary.avoided_amount, 0)
    ));
    if let Some(savings) = summary.annual_demo_savings {
        lines.push(format!(
            "Demo strategy assumes ${}M/year in cost avoidance.",
            format_millions(savings, 1)
        ));
    }
    lines.extend(summary.caveats.iter().cloned());
    lines
}

/// Formats a dollar amount as millions with thousands separators.
pub fn format_millions(dollars: f64, decimals: usize) -> String {
    let millions = dollars / MILLION;
    let formatted = format!("{:.*}", decimals, millions.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + whole.len() / 3 + 1);
    let negative = millions < 0.0 && formatted.bytes().any(|b| matches!(b, b'1'..=b'9'));
    if negative {
        grouped.push('-');
    }
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
