use super::types::{
    MILLION, Projection, ProjectionSeries, ProjectionSettings, ScenarioParameters,
    SummaryMetrics,
};

pub fn target_fci_caveat(target: f64) -> String {
    format!("Target FCI of {target} not yet directly modeled.")
}

pub fn project(params: &ScenarioParameters, settings: &ProjectionSettings) -> Projection {
    project_with_explanation(params, settings, Vec::new())
}

/// Runs the BAU and strategy recurrences side by side over the horizon.
///
/// Both series start at `settings.initial_backlog`. Each following year the
/// previous value compounds at the baseline rate; the strategy path then has
/// the flat annual investment and demolition savings subtracted and is floored
/// at zero.
pub fn project_with_explanation(
    params: &ScenarioParameters,
    settings: &ProjectionSettings,
    explanation: Vec<String>,
) -> Projection {
    let horizon = settings.horizon_years as usize;
    let mut bau = ProjectionSeries::with_capacity(horizon);
    let mut strategy = ProjectionSeries::with_capacity(horizon);

    let growth_factor = 1.0 + settings.baseline_growth_rate;
    let avoided_cost = annual_demo_savings(params, settings);
    let annual_reduction = params.annual_investment * MILLION + avoided_cost;

    let mut bau_value = settings.initial_backlog;
    let mut strategy_value = settings.initial_backlog;
    for offset in 0..settings.horizon_years {
        if offset > 0 {
            bau_value *= growth_factor;
            strategy_value = (strategy_value * growth_factor - annual_reduction).max(0.0);
        }
        let year = settings.start_year + offset as i32;
        bau.push(year, bau_value);
        strategy.push(year, strategy_value);
    }

    let summary = summarize(params, settings, &bau, &strategy, explanation);
    tracing::debug!(
        horizon_years = settings.horizon_years,
        final_strategy_value = summary.final_strategy_value,
        avoided_amount = summary.avoided_amount,
        "projected deferred maintenance"
    );

    Projection {
        bau,
        strategy,
        summary,
    }
}

fn annual_demo_savings(params: &ScenarioParameters, settings: &ProjectionSettings) -> f64 {
    params.demolition_ratio * settings.unit_demo_savings * MILLION
}

fn summarize(
    params: &ScenarioParameters,
    settings: &ProjectionSettings,
    bau: &ProjectionSeries,
    strategy: &ProjectionSeries,
    parsed_explanation: Vec<String>,
) -> SummaryMetrics {
    let final_bau_value = bau.last_value().unwrap_or(settings.initial_backlog);
    let final_strategy_value = strategy.last_value().unwrap_or(settings.initial_backlog);

    let annual_demo_savings =
        (params.demolition_ratio > 0.0).then(|| annual_demo_savings(params, settings));

    let caveats = params
        .target_condition_index
        .map(target_fci_caveat)
        .into_iter()
        .collect();

    SummaryMetrics {
        final_year: settings.end_year(),
        final_bau_value,
        final_strategy_value,
        avoided_amount: final_bau_value - final_strategy_value,
        annual_demo_savings,
        target_condition_index: params.target_condition_index,
        caveats,
        parsed_explanation,
    }
}
