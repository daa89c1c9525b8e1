use serde::Serialize;

pub const MILLION: f64 = 1_000_000.0;

/// Annual investment assumed when nothing else is specified, in $M/year.
pub const DEFAULT_BASE_INVESTMENT: f64 = 8.65;
/// Campus GSF growth in percent/year. Carried through to callers but not
/// applied by the projection.
pub const DEFAULT_GROWTH_RATE: f64 = 0.75;
/// Cost avoided per unit of demolition ratio, in $M/year.
pub const DEFAULT_UNIT_DEMO_SAVINGS: f64 = 2.0;
pub const DEFAULT_BASELINE_GROWTH_RATE: f64 = 0.06;
pub const DEFAULT_INITIAL_BACKLOG: f64 = 429_000_000.0;
pub const DEFAULT_START_YEAR: i32 = 2023;
pub const DEFAULT_HORIZON_YEARS: u32 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParameters {
    /// $M/year spent on backlog reduction.
    pub annual_investment: f64,
    /// Demolished-to-new-built ratio.
    pub demolition_ratio: f64,
    /// Percent/year.
    pub growth_rate: f64,
    pub target_condition_index: Option<f64>,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            annual_investment: DEFAULT_BASE_INVESTMENT,
            demolition_ratio: 0.0,
            growth_rate: DEFAULT_GROWTH_RATE,
            target_condition_index: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionSettings {
    pub start_year: i32,
    pub horizon_years: u32,
    /// Dollars outstanding at `start_year`.
    pub initial_backlog: f64,
    /// Fraction/year the backlog compounds at without intervention.
    pub baseline_growth_rate: f64,
    /// $M/year avoided per unit of demolition ratio.
    pub unit_demo_savings: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            horizon_years: DEFAULT_HORIZON_YEARS,
            initial_backlog: DEFAULT_INITIAL_BACKLOG,
            baseline_growth_rate: DEFAULT_BASELINE_GROWTH_RATE,
            unit_demo_savings: DEFAULT_UNIT_DEMO_SAVINGS,
        }
    }
}

impl ProjectionSettings {
    pub fn end_year(&self) -> Option<i32> {
        if self.horizon_years == 0 {
            None
        } else {
            Some(self.start_year + self.horizon_years as i32 - 1)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedQuestion {
    pub parameters: ScenarioParameters,
    /// Rules that fired, in the order they fired.
    pub explanation: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectionSeries(Vec<ProjectionPoint>);

impl ProjectionSeries {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub(crate) fn push(&mut self, year: i32, value: f64) {
        self.0.push(ProjectionPoint { year, value });
    }

    pub fn points(&self) -> &[ProjectionPoint] {
        &self.0
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|point| point.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.0.last().map(|point| point.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub final_year: Option<i32>,
    pub final_bau_value: f64,
    pub final_strategy_value: f64,
    /// BAU minus strategy at the final year. Negative when the strategy
    /// underperforms doing nothing.
    pub avoided_amount: f64,
    /// Dollars/year, present only when the demolition ratio is positive.
    pub annual_demo_savings: Option<f64>,
    pub target_condition_index: Option<f64>,
    pub caveats: Vec<String>,
    pub parsed_explanation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub bau: ProjectionSeries,
    pub strategy: ProjectionSeries,
    pub summary: SummaryMetrics,
}
