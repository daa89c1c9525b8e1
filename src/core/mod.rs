mod engine;
mod parser;
mod report;
mod types;

pub use engine::{project, project_with_explanation, target_fci_caveat};
pub use parser::{EXAMPLE_QUESTIONS, extract};
pub use report::{BAU_LABEL, format_millions, strategy_label, summary_lines};
pub use types::{
    DEFAULT_BASE_INVESTMENT, DEFAULT_BASELINE_GROWTH_RATE, DEFAULT_GROWTH_RATE,
    DEFAULT_HORIZON_YEARS, DEFAULT_INITIAL_BACKLOG, DEFAULT_START_YEAR, DEFAULT_UNIT_DEMO_SAVINGS,
    MILLION, ParsedQuestion, Projection, ProjectionPoint, ProjectionSeries, ProjectionSettings,
    ScenarioParameters, SummaryMetrics,
};
