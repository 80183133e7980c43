use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ChartSeries, PeriodRecord, PlanCalculation, PlanCalculator, PlanError, PlanParameters,
};

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[arg(long, help = "Initial deposit, at least 50")]
    pub initial_deposit: f64,
    #[arg(long, help = "Contribution made every period from the second one, at least 5")]
    pub periodic_contribution: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Number of periods in the plan, between 1 and 6000"
    )]
    pub num_periods: i64,
    #[arg(long, help = "Balance the plan must reach after the last period")]
    pub target_future_value: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    #[serde(alias = "deposit", alias = "initial_deposit")]
    initial_deposit: Option<f64>,
    #[serde(alias = "contribution", alias = "periodic_contribution")]
    periodic_contribution: Option<f64>,
    #[serde(alias = "periods", alias = "num_periods")]
    num_periods: Option<i64>,
    #[serde(alias = "target", alias = "target_future_value")]
    target_future_value: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub initial_deposit: f64,
    pub periodic_contribution: f64,
    pub num_periods: u32,
    pub target_future_value: f64,
    pub rate: f64,
    pub rate_percent: f64,
    pub iterations: u32,
    pub residual: f64,
    pub final_balance: f64,
    pub total_contributed: f64,
    pub total_interest: f64,
    pub schedule: Vec<PeriodRecord>,
    pub chart: ChartSeries,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
struct AppState {
    calculator: PlanCalculator,
}

pub fn build_params(args: PlanArgs) -> Result<PlanParameters, PlanError> {
    let num_periods = u32::try_from(args.num_periods)
        .map_err(|_| PlanError::InvalidParameter("number of periods must be >= 1".to_string()))?;
    PlanParameters::new(
        args.initial_deposit,
        args.periodic_contribution,
        num_periods,
        args.target_future_value,
    )
}

pub fn calculate_response(
    calculator: &PlanCalculator,
    args: PlanArgs,
) -> Result<CalculateResponse, PlanError> {
    let params = build_params(args)?;
    let calculation = calculator.calculate(&params)?;
    Ok(build_calculate_response(calculation))
}

pub fn router(calculator: PlanCalculator) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(AppState { calculator })
}

pub async fn run_http_server(port: u16, calculator: PlanCalculator) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(calculator);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "savings goal HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/calculate");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<CalculatePayload>,
) -> Response {
    calculate_handler_impl(state, payload).await
}

async fn calculate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<CalculatePayload>,
) -> Response {
    calculate_handler_impl(state, payload).await
}

async fn calculate_handler_impl(state: AppState, payload: CalculatePayload) -> Response {
    let args = plan_args_from_payload(payload);
    match calculate_response(&state.calculator, args) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!(error = %err, "calculation request rejected");
            error_response(status_for(&err), &err.to_string())
        }
    }
}

fn status_for(err: &PlanError) -> StatusCode {
    match err {
        PlanError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        PlanError::RootNotBracketed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn plan_args_from_json(json: &str) -> Result<PlanArgs, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(plan_args_from_payload(payload))
}

fn plan_args_from_payload(payload: CalculatePayload) -> PlanArgs {
    let mut args = default_plan_args_for_api();

    if let Some(v) = payload.initial_deposit {
        args.initial_deposit = v;
    }
    if let Some(v) = payload.periodic_contribution {
        args.periodic_contribution = v;
    }
    if let Some(v) = payload.num_periods {
        args.num_periods = v;
    }
    if let Some(v) = payload.target_future_value {
        args.target_future_value = v;
    }

    args
}

fn default_plan_args_for_api() -> PlanArgs {
    PlanArgs {
        initial_deposit: 1_000.0,
        periodic_contribution: 100.0,
        num_periods: 12,
        target_future_value: 2_500.0,
    }
}

fn build_calculate_response(calculation: PlanCalculation) -> CalculateResponse {
    let PlanCalculation {
        params,
        rate,
        iterations,
        residual,
        schedule,
        chart,
    } = calculation;

    CalculateResponse {
        initial_deposit: params.initial_deposit,
        periodic_contribution: params.periodic_contribution,
        num_periods: params.num_periods,
        target_future_value: params.target_future_value,
        rate: rate.value(),
        rate_percent: rate.as_percent(),
        iterations,
        residual,
        final_balance: schedule.final_balance(),
        total_contributed: schedule.total_contributed(),
        total_interest: schedule.total_interest(),
        schedule: schedule.records().to_vec(),
        chart,
    }
}
