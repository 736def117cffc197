use napi::Result as NapiResult;
use napi_derive::napi;

use rental_analytics_core::appreciation::resolver::{
    HistoricalMetricSource, InMemoryMetricSource, NeighborhoodMetricRecord,
};
use rental_analytics_core::reserves::components::ReserveTables;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn metric_source(records: Option<Vec<NeighborhoodMetricRecord>>) -> Option<InMemoryMetricSource> {
    records.map(InMemoryMetricSource::new)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct MortgageBindingInput {
    principal: rust_decimal::Decimal,
    annual_rate_percent: rust_decimal::Decimal,
    loan_term_years: u32,
    #[serde(default)]
    payments_made: Option<u32>,
}

#[derive(serde::Serialize)]
struct MortgageBindingOutput {
    monthly_payment: rust_decimal::Decimal,
    remaining_balance: rust_decimal::Decimal,
}

#[napi]
pub fn mortgage_payment(input_json: String) -> NapiResult<String> {
    let input: MortgageBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let monthly_payment = rental_analytics_core::mortgage::monthly_payment(
        input.principal,
        input.annual_rate_percent,
        input.loan_term_years,
    );
    let remaining_balance = rental_analytics_core::mortgage::remaining_balance(
        input.principal,
        input.annual_rate_percent,
        input.loan_term_years,
        input.payments_made.unwrap_or(0),
    );
    let output = MortgageBindingOutput {
        monthly_payment,
        remaining_balance,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reserves
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ReserveBindingInput {
    #[serde(flatten)]
    input: rental_analytics_core::reserves::estimator::ReserveInput,
    #[serde(default)]
    reserve_tables: Option<ReserveTables>,
}

#[napi]
pub fn estimate_reserves(input_json: String) -> NapiResult<String> {
    let binding_input: ReserveBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = binding_input.reserve_tables.unwrap_or_default();
    let output =
        rental_analytics_core::reserves::estimator::estimate_reserves(&binding_input.input, &tables)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cashflow
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct CashflowBindingInput {
    property: rental_analytics_core::PropertyFinancialInput,
    #[serde(default)]
    financing: rental_analytics_core::FinancingParameters,
    #[serde(default)]
    reserve_tables: Option<ReserveTables>,
}

#[napi]
pub fn calculate_cashflow(input_json: String) -> NapiResult<String> {
    let binding_input: CashflowBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tables = binding_input.reserve_tables.unwrap_or_default();
    let output = rental_analytics_core::cashflow::analysis::calculate_cashflow(
        &binding_input.property,
        &binding_input.financing,
        &tables,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Appreciation
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct RateBindingInput {
    #[serde(flatten)]
    input: rental_analytics_core::appreciation::resolver::RateResolverInput,
    #[serde(default)]
    historical_metrics: Option<Vec<NeighborhoodMetricRecord>>,
}

#[napi]
pub fn resolve_appreciation_rate(input_json: String) -> NapiResult<String> {
    let binding_input: RateBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let source = metric_source(binding_input.historical_metrics);
    let output = rental_analytics_core::appreciation::resolver::resolve_appreciation_rate(
        &binding_input.input,
        source.as_ref().map(|s| s as &dyn HistoricalMetricSource),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_appreciation(input_json: String) -> NapiResult<String> {
    let input: rental_analytics_core::appreciation::projection::AppreciationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_analytics_core::appreciation::projection::project_appreciation(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[napi]
pub fn score_deal(input_json: String) -> NapiResult<String> {
    let input: rental_analytics_core::scoring::deal::DealScoreInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        rental_analytics_core::scoring::deal::score_deal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Composite analysis
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct AnalyzeBindingInput {
    #[serde(flatten)]
    input: rental_analytics_core::analysis::DealAnalysisInput,
    #[serde(default)]
    historical_metrics: Option<Vec<NeighborhoodMetricRecord>>,
    #[serde(default)]
    reserve_tables: Option<ReserveTables>,
}

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let binding_input: AnalyzeBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let source = metric_source(binding_input.historical_metrics);
    let tables = binding_input.reserve_tables.unwrap_or_default();
    let output = rental_analytics_core::analysis::analyze_deal(
        &binding_input.input,
        source.as_ref().map(|s| s as &dyn HistoricalMetricSource),
        &tables,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
