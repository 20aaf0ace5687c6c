use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{
    FamilyPattern, FamilyType, FireStrategy, HousingType, IncomeType, REGIONS, ScenarioKind,
    SimulationDefaults, SimulationInput, calc_take_home, run_simulation, take_home_table,
};

mod error;
mod query;

pub use error::{ApiError, ApiResult};
pub use query::{from_query, to_query};

/// Largest gross salary accepted for take-home calculations, in yen.
pub const MAX_GROSS_INCOME: u64 = 10_000_000_000;
const MAX_AGE: u32 = 120;

#[derive(Clone)]
pub struct AppState {
    defaults: Arc<SimulationDefaults>,
}

impl AppState {
    pub fn new(defaults: SimulationDefaults) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }
}

/// JSON body for `POST /api/simulate`. Rates are percentages, currency is 万円.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    region: Option<String>,
    annual_income: Option<f64>,
    income_type: Option<String>,
    current_assets: Option<f64>,
    monthly_contribution: Option<f64>,
    family: Option<String>,
    housing: Option<String>,
    current_age: Option<u32>,
    target_age: Option<u32>,
    return_rate: Option<f64>,
    swr: Option<f64>,
    inflation: Option<f64>,
    strategy: Option<String>,
    yield_rate: Option<f64>,
    monthly_expense: Option<f64>,
    dividend_tax: Option<f64>,
    post_fire_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TakeHomeQuery {
    income: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, defaults: SimulationDefaults) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::new(defaults));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "FIRE calculator API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/regions", get(regions_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/take-home", get(take_home_handler))
        .route("/api/take-home/table", get(take_home_table_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn regions_handler() -> Response {
    json_response(StatusCode::OK, &REGIONS[..])
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    let input = from_query(uri.query().unwrap_or_default(), &state.defaults);
    simulate_handler_impl(input)
}

async fn simulate_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<SimulatePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    simulate_handler_impl(input_from_payload(payload, &state.defaults))
}

fn simulate_handler_impl(input: SimulationInput) -> ApiResult<Response> {
    validate_input(&input)?;
    let result = run_simulation(&input);
    tracing::debug!(
        region = %input.region,
        strategy = input.strategy.key(),
        neutral_years = ?result
            .scenario(ScenarioKind::Neutral)
            .and_then(|s| s.achievement_years),
        "simulation complete"
    );
    Ok(json_response(StatusCode::OK, result))
}

async fn take_home_handler(
    query: Result<Query<TakeHomeQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let gross = parse_gross_income(query.income.as_deref())?;
    let family = query
        .family
        .as_deref()
        .map(FamilyPattern::from_key)
        .unwrap_or(FamilyPattern::Single);

    tracing::debug!(gross, family = family.key(), "take-home calculation");
    Ok(json_response(StatusCode::OK, calc_take_home(gross, family)))
}

async fn take_home_table_handler(
    query: Result<Query<TakeHomeQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let family = query
        .family
        .as_deref()
        .map(FamilyPattern::from_key)
        .unwrap_or(FamilyPattern::Single);
    Ok(json_response(StatusCode::OK, take_home_table(family)))
}

fn parse_gross_income(raw: Option<&str>) -> ApiResult<u64> {
    let raw = raw.ok_or_else(|| ApiError::validation("income", "is required"))?;
    let gross = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ApiError::validation("income", "must be a whole number of yen"))?;
    validate_gross_income(gross)
}

/// Bounds a take-home salary to what the calculator is meant to answer.
pub fn validate_gross_income(gross: u64) -> ApiResult<u64> {
    if gross > MAX_GROSS_INCOME {
        return Err(ApiError::validation(
            "income",
            format!("must be at most {MAX_GROSS_INCOME}"),
        ));
    }
    Ok(gross)
}

fn input_from_payload(payload: SimulatePayload, defaults: &SimulationDefaults) -> SimulationInput {
    let mut input = defaults.input();

    if let Some(v) = payload.region {
        input.region = v;
    }
    if let Some(v) = payload.annual_income {
        input.annual_income = v;
    }
    if let Some(v) = payload.income_type {
        input.income_type = IncomeType::from_key(&v);
    }
    if let Some(v) = payload.current_assets {
        input.current_assets = v;
    }
    if let Some(v) = payload.monthly_contribution {
        input.monthly_contribution = v;
    }
    if let Some(v) = payload.family {
        input.family = FamilyType::from_key(&v);
    }
    if let Some(v) = payload.housing {
        input.housing = HousingType::from_key(&v);
    }
    if let Some(v) = payload.current_age {
        input.current_age = v;
    }
    input.target_age = payload.target_age;

    if let Some(v) = payload.return_rate {
        input.annual_return_rate = v / 100.0;
    }
    if let Some(v) = payload.swr {
        input.safe_withdrawal_rate = v / 100.0;
    }
    if let Some(v) = payload.inflation {
        input.inflation_rate = v / 100.0;
    }
    if let Some(v) = payload.strategy {
        input.strategy = FireStrategy::from_key(&v);
    }
    if let Some(v) = payload.yield_rate {
        input.gross_yield_rate = v / 100.0;
    }
    input.monthly_expense_override = payload.monthly_expense;
    if let Some(v) = payload.dividend_tax {
        input.dividend_tax_rate = v / 100.0;
    }
    input.post_fire_cost_override = payload.post_fire_cost;

    input
}

/// Rejects values the engine would compute on but that make no sense to
/// show a user. Unknown enum keys are not errors; they already fell back.
pub fn validate_input(input: &SimulationInput) -> ApiResult<()> {
    if input.current_age > MAX_AGE {
        return Err(ApiError::validation(
            "currentAge",
            format!("must be <= {MAX_AGE}"),
        ));
    }
    if let Some(target_age) = input.target_age {
        if target_age <= input.current_age {
            return Err(ApiError::validation(
                "targetAge",
                "must be greater than currentAge",
            ));
        }
        if target_age > MAX_AGE {
            return Err(ApiError::validation(
                "targetAge",
                format!("must be <= {MAX_AGE}"),
            ));
        }
    }

    let non_negative = [
        ("annualIncome", input.annual_income),
        ("currentAssets", input.current_assets),
        ("monthlyContribution", input.monthly_contribution),
        ("swr", input.safe_withdrawal_rate),
        ("yieldRate", input.gross_yield_rate),
        ("monthlyExpense", input.monthly_expense_override.unwrap_or(0.0)),
        ("postFireCost", input.post_fire_cost_override.unwrap_or(0.0)),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(ApiError::validation(field, "must be >= 0"));
        }
    }

    for (field, rate) in [
        ("returnRate", input.annual_return_rate),
        ("inflation", input.inflation_rate),
    ] {
        if !rate.is_finite() || rate <= -1.0 {
            return Err(ApiError::validation(field, "must be greater than -100%"));
        }
    }

    if !(0.0..=1.0).contains(&input.dividend_tax_rate) {
        return Err(ApiError::validation(
            "dividendTax",
            "must be between 0 and 100",
        ));
    }

    Ok(())
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
