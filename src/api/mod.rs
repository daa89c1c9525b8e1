use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BAU_LABEL, DEFAULT_BASE_INVESTMENT, DEFAULT_GROWTH_RATE, DEFAULT_HORIZON_YEARS,
    DEFAULT_INITIAL_BACKLOG, DEFAULT_START_YEAR, DEFAULT_UNIT_DEMO_SAVINGS, EXAMPLE_QUESTIONS,
    ProjectionSeries, ProjectionSettings, ScenarioParameters, SummaryMetrics, extract,
    project_with_explanation, strategy_label, summary_lines,
};

const MAX_HORIZON_YEARS: u32 = 200;
const MAX_ANNUAL_INVESTMENT: f64 = 50.0;
const MAX_DEMOLITION_RATIO: f64 = 2.0;
const MAX_GROWTH_RATE: f64 = 2.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    question: Option<String>,

    annual_investment: Option<f64>,
    demolition_ratio: Option<f64>,
    growth_rate: Option<f64>,
    target_fci: Option<f64>,

    initial_backlog: Option<f64>,
    start_year: Option<i32>,
    horizon_years: Option<u32>,
    baseline_growth_rate: Option<f64>,
    unit_demo_savings: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "dm-strategy",
    about = "Deferred maintenance projector (business-as-usual vs investment + demolition strategy)"
)]
pub struct Cli {
    #[arg(
        long,
        help = "Free-text question; when given it decides the strategy instead of the flags below"
    )]
    question: Option<String>,
    #[arg(
        long,
        default_value_t = DEFAULT_BASE_INVESTMENT,
        help = "Annual infrastructure investment in $M"
    )]
    annual_investment: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Demo-to-new-build ratio (2 means demolish 2 for every new build)"
    )]
    demolition_ratio: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_GROWTH_RATE,
        help = "Annual campus GSF growth in percent; reported but not applied"
    )]
    growth_rate: f64,
    #[arg(long, help = "Target facility condition index in (0, 1); reported but not applied")]
    target_fci: Option<f64>,
    #[arg(long, default_value_t = DEFAULT_INITIAL_BACKLOG, help = "Backlog at the start year in $")]
    initial_backlog: f64,
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS, help = "Years projected, start year included")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 6.0,
        allow_negative_numbers = true,
        help = "Business-as-usual backlog growth in percent"
    )]
    baseline_growth_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_UNIT_DEMO_SAVINGS,
        help = "Cost avoided per unit of demolition ratio in $M/year"
    )]
    unit_demo_savings: f64,
}

#[derive(Debug)]
struct ApiRequest {
    question: Option<String>,
    parameters: ScenarioParameters,
    settings: ProjectionSettings,
    explanation: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    question: Option<String>,
    parameters: ScenarioParameters,
    bau_label: &'static str,
    strategy_label: String,
    bau: ProjectionSeries,
    strategy: ProjectionSeries,
    summary: SummaryMetrics,
    summary_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExamplesResponse {
    examples: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<ApiRequest, String> {
    if cli.horizon_years > MAX_HORIZON_YEARS {
        return Err(format!(
            "--horizon-years must be <= {MAX_HORIZON_YEARS}"
        ));
    }

    if !(1900..=2200).contains(&cli.start_year) {
        return Err("--start-year must be between 1900 and 2200".to_string());
    }

    if !cli.initial_backlog.is_finite() || cli.initial_backlog < 0.0 {
        return Err("--initial-backlog must be a finite amount >= 0".to_string());
    }

    if !cli.baseline_growth_rate.is_finite() || cli.baseline_growth_rate <= -100.0 {
        return Err("--baseline-growth-rate must be > -100".to_string());
    }

    if !cli.unit_demo_savings.is_finite() || cli.unit_demo_savings < 0.0 {
        return Err("--unit-demo-savings must be a finite amount >= 0".to_string());
    }

    let settings = ProjectionSettings {
        start_year: cli.start_year,
        horizon_years: cli.horizon_years,
        initial_backlog: cli.initial_backlog,
        baseline_growth_rate: cli.baseline_growth_rate / 100.0,
        unit_demo_savings: cli.unit_demo_savings,
    };

    let question = cli
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    if let Some(question) = question {
        let parsed = extract(&question);
        return Ok(ApiRequest {
            question: Some(question),
            parameters: parsed.parameters,
            settings,
            explanation: parsed.explanation,
        });
    }

    if !(0.0..=MAX_ANNUAL_INVESTMENT).contains(&cli.annual_investment) {
        return Err(format!(
            "--annual-investment must be between 0 and {MAX_ANNUAL_INVESTMENT}"
        ));
    }

    if !(0.0..=MAX_DEMOLITION_RATIO).contains(&cli.demolition_ratio) {
        return Err(format!(
            "--demolition-ratio must be between 0 and {MAX_DEMOLITION_RATIO}"
        ));
    }

    if !(0.0..=MAX_GROWTH_RATE).contains(&cli.growth_rate) {
        return Err(format!(
            "--growth-rate must be between 0 and {MAX_GROWTH_RATE}"
        ));
    }

    if let Some(target) = cli.target_fci {
        if !(target > 0.0 && target < 1.0) {
            return Err("--target-fci must be between 0 and 1 (exclusive)".to_string());
        }
    }

    Ok(ApiRequest {
        question: None,
        parameters: ScenarioParameters {
            annual_investment: cli.annual_investment,
            demolition_ratio: cli.demolition_ratio,
            growth_rate: cli.growth_rate,
            target_condition_index: cli.target_fci,
        },
        settings,
        explanation: Vec::new(),
    })
}

/// Parses the process arguments, runs one projection and returns the JSON
/// response body.
pub fn run_cli() -> Result<String, String> {
    let request = build_inputs(Cli::parse())?;
    let response = simulate(request);
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode response: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/examples", get(examples_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "DM strategy HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn examples_handler() -> Response {
    json_response(
        StatusCode::OK,
        ExamplesResponse {
            examples: &EXAMPLE_QUESTIONS,
        },
    )
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::info!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let response = simulate(request);
    tracing::info!(
        question = response.question.is_some(),
        annual_investment = response.parameters.annual_investment,
        demolition_ratio = response.parameters.demolition_ratio,
        avoided_amount = response.summary.avoided_amount,
        "served simulation"
    );
    json_response(StatusCode::OK, response)
}

fn simulate(request: ApiRequest) -> SimulateResponse {
    let projection =
        project_with_explanation(&request.parameters, &request.settings, request.explanation);
    let lines = summary_lines(&projection);

    SimulateResponse {
        question: request.question,
        parameters: request.parameters,
        bau_label: BAU_LABEL,
        strategy_label: strategy_label(&request.parameters),
        bau: projection.bau,
        strategy: projection.strategy,
        summary: projection.summary,
        summary_lines: lines,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    cli.question = payload.question;

    if let Some(v) = payload.annual_investment {
        cli.annual_investment = v;
    }
    if let Some(v) = payload.demolition_ratio {
        cli.demolition_ratio = v;
    }
    if let Some(v) = payload.growth_rate {
        cli.growth_rate = v;
    }
    if payload.target_fci.is_some() {
        cli.target_fci = payload.target_fci;
    }

    if let Some(v) = payload.initial_backlog {
        cli.initial_backlog = v;
    }
    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.baseline_growth_rate {
        cli.baseline_growth_rate = v;
    }
    if let Some(v) = payload.unit_demo_savings {
        cli.unit_demo_savings = v;
    }

    build_inputs(cli).map_err(|msg| {
        msg.replace("--annual-investment", "annualInvestment")
            .replace("--demolition-ratio", "demolitionRatio")
            .replace("--growth-rate", "growthRate")
            .replace("--target-fci", "targetFci")
            .replace("--initial-backlog", "initialBacklog")
            .replace("--start-year", "startYear")
            .replace("--horizon-years", "horizonYears")
            .replace("--baseline-growth-rate", "baselineGrowthRate")
            .replace("--unit-demo-savings", "unitDemoSavings")
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        question: None,
        annual_investment: DEFAULT_BASE_INVESTMENT,
        demolition_ratio: 0.0,
        growth_rate: DEFAULT_GROWTH_RATE,
        target_fci: None,
        initial_backlog: DEFAULT_INITIAL_BACKLOG,
        start_year: DEFAULT_START_YEAR,
        horizon_years: DEFAULT_HORIZON_YEARS,
        baseline_growth_rate: 6.0,
        unit_demo_savings: DEFAULT_UNIT_DEMO_SAVINGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    fn assert_golden_snapshot(path: &str, actual: &str) {
        let update = matches!(
            std::env::var("UPDATE_GOLDEN").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );
        let snapshot_path = Path::new(path);

        if update {
            if let Some(parent) = snapshot_path.parent() {
                fs::create_dir_all(parent).expect("failed to create snapshot directory");
            }
            fs::write(snapshot_path, actual).expect("failed to write golden snapshot");
            return;
        }

        let expected = fs::read_to_string(snapshot_path).unwrap_or_else(|_| {
            panic!("missing golden snapshot at {path}; run with UPDATE_GOLDEN=1 to generate")
        });
        assert_eq!(
            actual, expected,
            "snapshot mismatch for {path}; run with UPDATE_GOLDEN=1 to refresh if expected"
        );
    }

    #[test]
    fn build_inputs_converts_baseline_growth_percent_to_fraction() {
        let request = build_inputs(sample_cli()).expect("valid inputs");
        assert_approx(request.settings.baseline_growth_rate, 0.06);
        assert_eq!(request.settings, ProjectionSettings::default());
        assert_eq!(request.parameters, ScenarioParameters::default());
    }

    #[test]
    fn build_inputs_rejects_out_of_range_sliders() {
        let mut cli = sample_cli();
        cli.annual_investment = 60.0;
        let err = build_inputs(cli).expect_err("must reject investment above slider max");
        assert!(err.contains("--annual-investment"));

        let mut cli = sample_cli();
        cli.demolition_ratio = -0.1;
        let err = build_inputs(cli).expect_err("must reject negative ratio");
        assert!(err.contains("--demolition-ratio"));

        let mut cli = sample_cli();
        cli.growth_rate = 2.5;
        let err = build_inputs(cli).expect_err("must reject growth above slider max");
        assert!(err.contains("--growth-rate"));
    }

    #[test]
    fn build_inputs_rejects_target_fci_outside_unit_interval() {
        let mut cli = sample_cli();
        cli.target_fci = Some(1.0);
        let err = build_inputs(cli).expect_err("must reject fci of 1");
        assert!(err.contains("--target-fci"));
    }

    #[test]
    fn build_inputs_rejects_oversized_horizon() {
        let mut cli = sample_cli();
        cli.horizon_years = MAX_HORIZON_YEARS + 1;
        let err = build_inputs(cli).expect_err("must reject long horizon");
        assert!(err.contains("--horizon-years"));
    }

    #[test]
    fn build_inputs_allows_zero_horizon() {
        let mut cli = sample_cli();
        cli.horizon_years = 0;
        let request = build_inputs(cli).expect("zero horizon is valid");
        let response = simulate(request);
        assert!(response.bau.is_empty());
        assert!(response.strategy.is_empty());
    }

    #[test]
    fn build_inputs_question_overrides_slider_flags() {
        let mut cli = sample_cli();
        cli.question = Some("  increase by 45m  ".to_string());
        cli.annual_investment = 1.0;

        let request = build_inputs(cli).expect("question drives parameters");
        assert_eq!(request.question.as_deref(), Some("increase by 45m"));
        assert_approx(request.parameters.annual_investment, 53.65);
        assert_eq!(request.explanation.len(), 1);
    }

    #[test]
    fn build_inputs_blank_question_falls_back_to_flags() {
        let mut cli = sample_cli();
        cli.question = Some("   ".to_string());
        cli.annual_investment = 12.0;

        let request = build_inputs(cli).expect("valid inputs");
        assert_eq!(request.question, None);
        assert_approx(request.parameters.annual_investment, 12.0);
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "annualInvestment": 20.5,
          "demolitionRatio": 1.5,
          "growthRate": 1.25,
          "targetFci": 0.2,
          "initialBacklog": 300000000,
          "startYear": 2025,
          "horizonYears": 10,
          "baselineGrowthRate": 4.5,
          "unitDemoSavings": 3
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.parameters.annual_investment, 20.5);
        assert_approx(request.parameters.demolition_ratio, 1.5);
        assert_approx(request.parameters.growth_rate, 1.25);
        assert_eq!(request.parameters.target_condition_index, Some(0.2));
        assert_approx(request.settings.initial_backlog, 300_000_000.0);
        assert_eq!(request.settings.start_year, 2025);
        assert_eq!(request.settings.horizon_years, 10);
        assert_approx(request.settings.baseline_growth_rate, 0.045);
        assert_approx(request.settings.unit_demo_savings, 3.0);
    }

    #[test]
    fn api_errors_use_payload_key_names() {
        let err = api_request_from_json(r#"{"demolitionRatio": 3}"#)
            .expect_err("must reject ratio above slider max");
        assert!(err.contains("demolitionRatio"));
        assert!(!err.contains("--"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let request = api_request_from_json(r#"{"question": "keep fci under 0.25"}"#)
            .expect("json should parse");
        let response = simulate(request);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"bauLabel\""));
        assert!(json.contains("\"strategyLabel\""));
        assert!(json.contains("\"finalStrategyValue\""));
        assert!(json.contains("\"avoidedAmount\""));
        assert!(json.contains("\"parsedExplanation\""));
        assert!(json.contains("\"summaryLines\""));
        assert!(json.contains("not yet directly modeled"));
        assert!(json.contains("{\"year\":2023,\"value\":429000000.0}"));
    }

    #[test]
    fn examples_are_all_understood_by_the_extractor() {
        for question in EXAMPLE_QUESTIONS {
            assert!(!extract(question).explanation.is_empty(), "{question}");
        }
    }

    #[test]
    fn golden_snapshot_double_with_demo_json() {
        let request = api_request_from_json(
            r#"{"question": "What if we double our investment and demolish 1 building for every 2 we build?"}"#,
        )
        .expect("json should parse");
        let response = simulate(request);
        let json = format!(
            "{}\n",
            serde_json::to_string(&response).expect("response should serialize")
        );

        assert_golden_snapshot("tests/golden/double_with_demo.json", &json);
    }
}
