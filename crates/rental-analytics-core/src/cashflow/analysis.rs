use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cashflow::tax;
use crate::error::RentalAnalyticsError;
use crate::mortgage;
use crate::reserves::components::ReserveTables;
use crate::reserves::estimator::{self, CapExBreakdown};
use crate::types::{
    with_metadata, ComputationOutput, FinancingParameters, Money, Percent, PropertyFinancialInput,
};
use crate::RentalAnalyticsResult;

const HUNDRED: Decimal = dec!(100);
const MONTHS: Decimal = dec!(12);
const HIGH_LTV_PCT: Decimal = dec!(80);

/// Full monthly/annual cashflow picture for one property. Field names are
/// stable; downstream consumers key on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialComponents {
    pub purchase_price: Money,
    pub down_payment_amount: Money,
    pub down_payment_percentage: Percent,
    pub loan_amount: Money,
    pub annual_rate_percent: Percent,
    pub loan_term_years: u32,
    pub monthly_p_and_i: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_taxes: Option<Money>,
    pub monthly_taxes: Money,
    pub monthly_insurance: Money,
    pub misc_monthly: Money,
    pub estimated_monthly_rent: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy_rate_pct: Option<Percent>,
    pub effective_rent_after_vacancy: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_mgmt_fee_pct: Option<Percent>,
    pub monthly_property_mgmt: Money,
    pub maintenance_pct: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_maintenance_percent: Option<Percent>,
    pub monthly_maintenance: Money,
    pub capex_pct: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_capex_percent: Option<Percent>,
    pub monthly_capex: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capex_breakdown: Option<CapExBreakdown>,
    pub utilities_monthly: Money,
    pub total_monthly_expenses: Money,
    pub net_monthly_cashflow: Money,
    pub annual_cashflow: Money,
    pub cash_on_cash_roi: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_noi: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_rate: Option<Percent>,
    pub use_dynamic_capex: bool,
}

/// Combine financing, taxes, insurance, vacancy, and reserve assumptions
/// into the monthly cashflow picture.
///
/// Reserve, management, and utility lines enter the expense total only in
/// dynamic mode; flat mode keeps the total to P&I, taxes, insurance, and
/// misc. NOI and cap rate are produced in dynamic mode only.
pub fn calculate_cashflow(
    property: &PropertyFinancialInput,
    financing: &FinancingParameters,
    tables: &ReserveTables,
) -> RentalAnalyticsResult<ComputationOutput<FinancialComponents>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let price = property.purchase_price;
    if price <= Decimal::ZERO {
        return Err(RentalAnalyticsError::InvalidInput {
            field: "purchase_price".to_string(),
            reason: "purchase price must be positive".to_string(),
        });
    }

    let rent = match property.estimated_monthly_rent {
        Some(rent) => rent,
        None => {
            warnings.push("Estimated monthly rent missing; using $0.".to_string());
            Decimal::ZERO
        }
    };

    let mut down_payment = financing.down_payment_dollars;
    if down_payment > price {
        warnings.push(format!(
            "Down payment (${down_payment}) exceeds purchase price; clamping loan to $0."
        ));
        down_payment = price;
    } else if down_payment < Decimal::ZERO {
        warnings.push("Negative down payment; using $0.".to_string());
        down_payment = Decimal::ZERO;
    }
    let loan_amount = price - down_payment;
    let down_payment_percentage = down_payment / price * HUNDRED;

    let monthly_p_and_i = mortgage::monthly_payment(
        loan_amount,
        financing.annual_rate_percent,
        financing.loan_term_years,
    );

    let annual_taxes = match property.tax_info_raw.as_deref() {
        Some(raw) => {
            let parsed = tax::parse_annual_tax(raw);
            if parsed.is_none() {
                warnings.push(format!(
                    "Could not parse a tax amount from '{raw}'; monthly taxes set to $0."
                ));
            }
            parsed
        }
        None => {
            warnings.push("No tax information provided; monthly taxes set to $0.".to_string());
            None
        }
    };
    let monthly_taxes = annual_taxes.map_or(Decimal::ZERO, |t| t / MONTHS);
    let monthly_insurance = financing.annual_insurance / MONTHS;

    let mut effective_rent = rent;
    let mut monthly_property_mgmt = Decimal::ZERO;
    let mut monthly_maintenance = Decimal::ZERO;
    let mut monthly_capex = Decimal::ZERO;
    let mut utilities_monthly = Decimal::ZERO;
    let mut vacancy_rate_pct = None;
    let mut property_mgmt_fee_pct = None;
    let mut adjusted_maintenance_percent = None;
    let mut adjusted_capex_percent = None;
    let mut capex_breakdown = None;

    if financing.use_dynamic_capex {
        effective_rent = rent * (Decimal::ONE - financing.vacancy_rate_pct / HUNDRED);
        monthly_property_mgmt = effective_rent * financing.property_mgmt_fee_pct / HUNDRED;

        let condition =
            estimator::resolve_condition(property.property_condition.as_deref(), &mut warnings);
        let age = estimator::resolve_age(property.property_age, &mut warnings);
        let condition_mult = tables.condition_multiplier(condition);
        let age_mult = tables.age_multiplier(age);

        let adj_maint_pct = financing.maintenance_pct * age_mult * condition_mult;
        monthly_maintenance = price * (adj_maint_pct / HUNDRED) / MONTHS;
        adjusted_maintenance_percent = Some(adj_maint_pct);

        let breakdown = estimator::capex_breakdown(
            price,
            property.square_feet,
            condition_mult,
            age_mult,
            tables,
            &mut warnings,
        );
        monthly_capex = breakdown.total_monthly;
        adjusted_capex_percent = Some(breakdown.percent_of_value);
        capex_breakdown = Some(breakdown);

        utilities_monthly = financing.utilities_monthly;
        vacancy_rate_pct = Some(financing.vacancy_rate_pct);
        property_mgmt_fee_pct = Some(financing.property_mgmt_fee_pct);
    }

    let mut total_monthly_expenses =
        monthly_p_and_i + monthly_taxes + monthly_insurance + financing.misc_monthly;
    if financing.use_dynamic_capex {
        total_monthly_expenses +=
            monthly_property_mgmt + monthly_maintenance + monthly_capex + utilities_monthly;
    }

    let net_monthly_cashflow = effective_rent - total_monthly_expenses;
    let annual_cashflow = net_monthly_cashflow * MONTHS;
    let cash_on_cash_roi = if down_payment > Decimal::ZERO {
        annual_cashflow / down_payment * HUNDRED
    } else {
        Decimal::ZERO
    };

    // NOI excludes debt service but carries every operating line.
    let (annual_noi, cap_rate) = if financing.use_dynamic_capex {
        let operating_annual = (monthly_taxes
            + monthly_insurance
            + monthly_property_mgmt
            + monthly_maintenance
            + monthly_capex
            + utilities_monthly
            + financing.misc_monthly)
            * MONTHS;
        let noi = effective_rent * MONTHS - operating_annual;
        (Some(noi), Some(noi / price * HUNDRED))
    } else {
        (None, None)
    };

    let ltv = loan_amount / price * HUNDRED;
    if ltv > HIGH_LTV_PCT {
        warnings.push(format!(
            "Loan-to-value is {}%; lenders may require mortgage insurance above 80%.",
            ltv.round_dp(1)
        ));
    }

    let result = FinancialComponents {
        purchase_price: price,
        down_payment_amount: down_payment,
        down_payment_percentage,
        loan_amount,
        annual_rate_percent: financing.annual_rate_percent,
        loan_term_years: financing.loan_term_years,
        monthly_p_and_i,
        annual_taxes,
        monthly_taxes,
        monthly_insurance,
        misc_monthly: financing.misc_monthly,
        estimated_monthly_rent: rent,
        vacancy_rate_pct,
        effective_rent_after_vacancy: effective_rent,
        property_mgmt_fee_pct,
        monthly_property_mgmt,
        maintenance_pct: financing.maintenance_pct,
        adjusted_maintenance_percent,
        monthly_maintenance,
        capex_pct: financing.capex_pct,
        adjusted_capex_percent,
        monthly_capex,
        capex_breakdown,
        utilities_monthly,
        total_monthly_expenses,
        net_monthly_cashflow,
        annual_cashflow,
        cash_on_cash_roi,
        annual_noi,
        cap_rate,
        use_dynamic_capex: financing.use_dynamic_capex,
    };

    let assumptions = json!({
        "loan_term_years": financing.loan_term_years,
        "annual_rate_percent": financing.annual_rate_percent,
        "annual_insurance": financing.annual_insurance,
        "misc_monthly": financing.misc_monthly,
        "vacancy_rate_pct": financing.vacancy_rate_pct,
        "property_mgmt_fee_pct": financing.property_mgmt_fee_pct,
        "maintenance_pct": financing.maintenance_pct,
        "capex_pct": financing.capex_pct,
        "utilities_monthly": financing.utilities_monthly,
        "use_dynamic_capex": financing.use_dynamic_capex,
        "property_age": property.property_age,
        "property_condition": property.property_condition,
        "square_feet": property.square_feet,
    });

    Ok(with_metadata(
        "Monthly cashflow from financing, taxes, insurance, and reserve assumptions",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}
