use std::time::Instant;

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::RentalAnalyticsError;
use crate::mortgage;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentalAnalyticsResult;

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppreciationInput {
    pub purchase_price: Money,
    pub down_payment_dollars: Money,
    pub loan_amount: Money,
    /// Loan interest rate, annual percent.
    pub annual_rate_percent: Percent,
    pub loan_term_years: u32,
    pub annual_cashflow: Money,
    pub investment_horizon_years: u32,
    /// Resolved appreciation rate, annual percent.
    pub appreciation_rate_percent: Percent,
    #[serde(default)]
    pub rate_source: String,
    #[serde(default)]
    pub market_outlook: String,
}

/// Value, equity, and return projection over the investment horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppreciationResult {
    pub investment_horizon_years: u32,
    pub annual_appreciation_rate_used: Percent,
    pub source_of_data: String,
    pub future_value: Money,
    pub total_appreciation: Money,
    pub appreciation_percent_total: Percent,
    pub remaining_loan_balance: Money,
    pub equity_from_mortgage_paydown: Money,
    pub initial_equity: Money,
    pub total_equity_at_horizon: Money,
    pub total_cashflow_over_horizon: Money,
    pub total_profit: Money,
    pub total_roi_percent_on_equity: Percent,
    pub annualized_roi_on_equity: Percent,
    pub market_outlook_assessment: String,
}

/// Project property value, equity buildup, and ROI over the horizon.
/// Appreciation compounds annually; loan paydown follows the closed-form
/// amortization balance.
pub fn project_appreciation(
    input: &AppreciationInput,
) -> RentalAnalyticsResult<ComputationOutput<AppreciationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.purchase_price <= Decimal::ZERO {
        return Err(RentalAnalyticsError::InvalidInput {
            field: "purchase_price".to_string(),
            reason: "purchase price must be positive".to_string(),
        });
    }

    let horizon = input.investment_horizon_years;
    let growth = mortgage::compound_factor(input.appreciation_rate_percent / HUNDRED, horizon);
    let future_value = input.purchase_price * growth;
    let total_appreciation = future_value - input.purchase_price;
    let appreciation_percent_total = total_appreciation / input.purchase_price * HUNDRED;

    let remaining_loan_balance = mortgage::remaining_balance(
        input.loan_amount,
        input.annual_rate_percent,
        input.loan_term_years,
        horizon * MONTHS_PER_YEAR,
    );
    let equity_from_mortgage_paydown = input.loan_amount - remaining_loan_balance;

    let initial_equity = input.down_payment_dollars;
    let total_equity_at_horizon = initial_equity + equity_from_mortgage_paydown + total_appreciation;
    let total_cashflow_over_horizon = input.annual_cashflow * Decimal::from(horizon);
    let total_profit = total_equity_at_horizon - initial_equity + total_cashflow_over_horizon;

    let down_payment = input.down_payment_dollars;
    let total_roi_percent_on_equity = if down_payment > Decimal::ZERO {
        total_profit / down_payment * HUNDRED
    } else {
        warnings.push("Down payment is zero; ROI-on-equity metrics reported as 0.".to_string());
        Decimal::ZERO
    };

    let annualized_roi_on_equity =
        annualized_roi(down_payment, total_profit, horizon, &mut warnings);

    let result = AppreciationResult {
        investment_horizon_years: horizon,
        annual_appreciation_rate_used: input.appreciation_rate_percent,
        source_of_data: non_empty_or(&input.rate_source, "Unknown"),
        future_value,
        total_appreciation,
        appreciation_percent_total,
        remaining_loan_balance,
        equity_from_mortgage_paydown,
        initial_equity,
        total_equity_at_horizon,
        total_cashflow_over_horizon,
        total_profit,
        total_roi_percent_on_equity,
        annualized_roi_on_equity,
        market_outlook_assessment: non_empty_or(&input.market_outlook, "N/A"),
    };

    let assumptions = json!({
        "purchase_price": input.purchase_price,
        "appreciation_rate_percent": input.appreciation_rate_percent,
        "investment_horizon_years": horizon,
        "loan_term_years": input.loan_term_years,
        "annual_rate_percent": input.annual_rate_percent,
        "rate_source": result.source_of_data,
    });

    Ok(with_metadata(
        "Compound annual appreciation with closed-form loan paydown",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

/// Geometric-mean annual return on the down payment. Guarded so a wiped-out
/// position (or a degenerate horizon) reports 0 instead of a math error.
fn annualized_roi(
    down_payment: Money,
    total_profit: Money,
    horizon_years: u32,
    warnings: &mut Vec<String>,
) -> Percent {
    if down_payment <= Decimal::ZERO || horizon_years == 0 {
        return Decimal::ZERO;
    }
    let terminal = down_payment + total_profit;
    if terminal <= Decimal::ZERO {
        warnings.push("Total value at horizon is non-positive; annualized ROI reported as 0.".to_string());
        return Decimal::ZERO;
    }
    let base = terminal / down_payment;
    let exponent = Decimal::ONE / Decimal::from(horizon_years);
    (base.powd(exponent) - Decimal::ONE) * HUNDRED
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn five_year_input() -> AppreciationInput {
        AppreciationInput {
            purchase_price: dec!(400000),
            down_payment_dollars: dec!(80000),
            loan_amount: dec!(320000),
            annual_rate_percent: dec!(6.5),
            loan_term_years: 30,
            annual_cashflow: dec!(-871.44),
            investment_horizon_years: 5,
            appreciation_rate_percent: dec!(4),
            rate_source: "Manual Rate Override".to_string(),
            market_outlook: String::new(),
        }
    }

    #[test]
    fn test_future_value_compounds_annually() {
        // 400,000 * 1.04^5 = 486,661.16096 exactly
        let output = project_appreciation(&five_year_input()).unwrap();
        assert_eq!(output.result.future_value.round_dp(5), dec!(486661.16096));
        assert_eq!(
            output.result.total_appreciation.round_dp(5),
            dec!(86661.16096)
        );
        assert_eq!(
            output.result.appreciation_percent_total.round_dp(4),
            dec!(21.6653)
        );
    }

    #[test]
    fn test_paydown_and_balance_split_the_loan() {
        // Closed-form balance on 320k at 6.5%/30y after 60 payments: 299,555.13
        let output = project_appreciation(&five_year_input()).unwrap();
        let result = &output.result;
        assert!((result.remaining_loan_balance - dec!(299555.13)).abs() < dec!(0.05));
        assert_eq!(
            result.equity_from_mortgage_paydown + result.remaining_loan_balance,
            dec!(320000)
        );
    }

    #[test]
    fn test_profit_and_roi_line_up() {
        let output = project_appreciation(&five_year_input()).unwrap();
        let result = &output.result;
        assert_eq!(result.total_cashflow_over_horizon, dec!(-4357.20));
        assert!((result.total_profit - dec!(102748.83)).abs() < dec!(0.05));
        assert!((result.total_roi_percent_on_equity - dec!(128.436)).abs() < dec!(0.005));
        assert!((result.annualized_roi_on_equity - dec!(17.965)).abs() < dec!(0.005));
        assert_eq!(result.market_outlook_assessment, "N/A");
    }

    #[test]
    fn test_zero_down_payment_reports_zero_roi() {
        let mut input = five_year_input();
        input.down_payment_dollars = Decimal::ZERO;
        input.loan_amount = dec!(400000);
        let output = project_appreciation(&input).unwrap();
        assert_eq!(output.result.total_roi_percent_on_equity, Decimal::ZERO);
        assert_eq!(output.result.annualized_roi_on_equity, Decimal::ZERO);
        assert!(output.warnings.iter().any(|w| w.contains("Down payment is zero")));
    }

    #[test]
    fn test_zero_horizon_is_a_no_op_projection() {
        let mut input = five_year_input();
        input.investment_horizon_years = 0;
        let output = project_appreciation(&input).unwrap();
        let result = &output.result;
        assert_eq!(result.future_value, dec!(400000));
        assert_eq!(result.remaining_loan_balance, dec!(320000));
        assert_eq!(result.total_profit, Decimal::ZERO);
        assert_eq!(result.annualized_roi_on_equity, Decimal::ZERO);
    }

    #[test]
    fn test_wiped_out_position_warns_instead_of_failing() {
        let mut input = five_year_input();
        input.annual_cashflow = dec!(-50000);
        let output = project_appreciation(&input).unwrap();
        assert_eq!(output.result.annualized_roi_on_equity, Decimal::ZERO);
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("non-positive; annualized ROI")));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let mut input = five_year_input();
        input.purchase_price = Decimal::ZERO;
        assert!(project_appreciation(&input).is_err());
    }
}
