use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::appreciation::projection::{self, AppreciationInput, AppreciationResult};
use crate::appreciation::resolver::{
    self, HistoricalMetricSource, RateResolution, RateResolverInput,
};
use crate::cashflow::analysis::{self as cashflow, FinancialComponents};
use crate::reserves::components::ReserveTables;
use crate::scoring::deal::{self, DealScore, DealScoreInput};
use crate::types::{with_metadata, ComputationOutput, FinancingParameters, PropertyFinancialInput};
use crate::RentalAnalyticsResult;

/// Everything needed for a full deal analysis in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysisInput {
    pub property: PropertyFinancialInput,
    #[serde(default)]
    pub financing: FinancingParameters,
    #[serde(default)]
    pub appreciation: RateResolverInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub financials: FinancialComponents,
    pub rate_resolution: RateResolution,
    pub appreciation: AppreciationResult,
    pub score: DealScore,
}

/// Run the full pipeline: cashflow, rate resolution, appreciation
/// projection, and deal scoring. Warnings from every stage are merged into
/// the composite envelope in pipeline order.
pub fn analyze_deal(
    input: &DealAnalysisInput,
    source: Option<&dyn HistoricalMetricSource>,
    tables: &ReserveTables,
) -> RentalAnalyticsResult<ComputationOutput<DealAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cashflow_output = cashflow::calculate_cashflow(&input.property, &input.financing, tables)?;
    warnings.extend(cashflow_output.warnings);
    let financials = cashflow_output.result;

    let resolver_input = effective_resolver_input(input);
    let rate_output = resolver::resolve_appreciation_rate(&resolver_input, source)?;
    warnings.extend(rate_output.warnings);
    let rate_resolution = rate_output.result;

    let projection_input = AppreciationInput {
        purchase_price: financials.purchase_price,
        down_payment_dollars: financials.down_payment_amount,
        loan_amount: financials.loan_amount,
        annual_rate_percent: financials.annual_rate_percent,
        loan_term_years: financials.loan_term_years,
        annual_cashflow: financials.annual_cashflow,
        investment_horizon_years: input.financing.investment_horizon_years,
        appreciation_rate_percent: rate_resolution.annual_rate_percent,
        rate_source: rate_resolution.source.clone(),
        market_outlook: rate_resolution.outlook.clone(),
    };
    let projection_output = projection::project_appreciation(&projection_input)?;
    warnings.extend(projection_output.warnings);
    let appreciation = projection_output.result;

    let score_input = DealScoreInput {
        net_monthly_cashflow: financials.net_monthly_cashflow,
        cash_on_cash_roi: financials.cash_on_cash_roi,
        cap_rate: financials.cap_rate,
        annualized_roi_on_equity: appreciation.annualized_roi_on_equity,
        use_dynamic_capex: financials.use_dynamic_capex,
    };
    let score_output = deal::score_deal(&score_input)?;
    warnings.extend(score_output.warnings);
    let score = score_output.result;

    let assumptions = json!({
        "investment_horizon_years": input.financing.investment_horizon_years,
        "use_dynamic_capex": input.financing.use_dynamic_capex,
        "rate_tier": rate_resolution.tier,
        "rate_source": rate_resolution.source,
    });

    let result = DealAnalysis {
        address: input.property.address.clone(),
        financials,
        rate_resolution,
        appreciation,
        score,
    };

    Ok(with_metadata(
        "Composite deal analysis: cashflow, rate resolution, appreciation, scoring",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

/// The resolver input is its own document, but neighborhood, city, and the
/// manual override may also arrive on the property or financing records.
/// Explicit resolver fields win; the property/financing values fill gaps.
fn effective_resolver_input(input: &DealAnalysisInput) -> RateResolverInput {
    let mut resolver_input = input.appreciation.clone();
    if resolver_input.neighborhood.is_none() {
        resolver_input.neighborhood = input.property.neighborhood.clone();
    }
    if resolver_input.city.is_none() {
        resolver_input.city = input.property.city.clone();
    }
    if let Some(manual) = input.financing.manual_appreciation_rate {
        resolver_input.manual_rate = Some(manual);
    }
    resolver_input
}
