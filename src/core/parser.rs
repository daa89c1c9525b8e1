use std::sync::LazyLock;

use regex::Regex;

use super::engine::target_fci_caveat;
use super::types::{DEFAULT_BASE_INVESTMENT, ParsedQuestion, ScenarioParameters};

/// "increase the budget by $5 million", "add 2.5m".
static INVESTMENT_DELTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:increase|add)\w*\b.*?\$?\b(\d+(?:\.\d+)?)\s?m(?:illion)?\b").unwrap()
});

static ONE_DEMO_PER_TWO_BUILDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b1\b.*\bdemo.*\b2\b.*\bbuil",
        r"|\bone\b.*\bdemo.*\btwo\b",
        r"|\bdemo\w*\s+(?:1|one)\b.*\b(?:2|two)\b.*\bbuil",
    ))
    .unwrap()
});

static TWO_DEMOS_PER_BUILD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b2\b.*\bdemo.*\b1\b.*\bbuil",
        r"|\btwo\b.*\bdemo.*\bone\b",
        r"|\bdemo\w*\s+(?:2|two)\b.*\b(?:1|one|each|every)\b.*\bbuil",
    ))
    .unwrap()
});

static NO_DEMO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bno\s+demo").unwrap());

static TARGET_FCI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfci\b.*\b(?:under|below)\s+(0\.\d+)").unwrap()
});

pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What if we double our investment and demolish 1 building for every 2 we build?",
    "How much would we avoid if we increase the budget by $5 million per year?",
    "Can we keep FCI under 0.25 if we add $3m a year with no demolition?",
];

/// Maps a free-text question onto scenario parameters.
///
/// Each category (investment, demolition, target FCI) is matched
/// independently against the lowercased text and the first rule to match
/// wins. Unmatched categories keep their defaults. The explanation lists one
/// line per rule that fired, in evaluation order.
pub fn extract(question: &str) -> ParsedQuestion {
    let text = question.to_lowercase();
    let mut parameters = ScenarioParameters::default();
    let mut explanation = Vec::new();

    if let Some(delta) = INVESTMENT_DELTA_RE
        .captures(&text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
    {
        parameters.annual_investment = DEFAULT_BASE_INVESTMENT + delta;
        explanation.push(format!(
            "Increased annual investment by ${delta}M to ${:.2}M/year",
            parameters.annual_investment
        ));
    } else if text.contains("double") {
        parameters.annual_investment = DEFAULT_BASE_INVESTMENT * 2.0;
        explanation.push(format!(
            "Doubled the base investment to ${:.2}M/year",
            parameters.annual_investment
        ));
    }

    if ONE_DEMO_PER_TWO_BUILDS_RE.is_match(&text) {
        parameters.demolition_ratio = 0.5;
        explanation.push("Assumed 1 demolition for every 2 new builds (ratio 0.5)".to_string());
    } else if TWO_DEMOS_PER_BUILD_RE.is_match(&text) {
        parameters.demolition_ratio = 2.0;
        explanation.push("Assumed 2 demolitions for every new build (ratio 2.0)".to_string());
    } else if NO_DEMO_RE.is_match(&text) {
        parameters.demolition_ratio = 0.0;
        explanation.push("No demolition assumed (ratio 0.0)".to_string());
    }

    if let Some(target) = TARGET_FCI_RE
        .captures(&text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
    {
        parameters.target_condition_index = Some(target);
        explanation.push(format!(
            "Target FCI below {target} noted. {}",
            target_fci_caveat(target)
        ));
    }

    tracing::debug!(
        rules_fired = explanation.len(),
        annual_investment = parameters.annual_investment,
        demolition_ratio = parameters.demolition_ratio,
        "extracted scenario parameters"
    );

    ParsedQuestion {
        parameters,
        explanation,
    }
}
