use rental_analytics_core::cashflow::analysis::calculate_cashflow;
use rental_analytics_core::reserves::components::ReserveTables;
use rental_analytics_core::types::{FinancingParameters, PropertyFinancialInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn reference_property() -> PropertyFinancialInput {
    serde_json::from_value(json!({
        "address": "123 Raleigh St, Denver, CO",
        "purchase_price": "400000",
        "tax_info_raw": "$4,800 / Annually",
        "estimated_monthly_rent": "2500",
        "square_feet": "1500",
        "property_age": 20,
        "property_condition": "good"
    }))
    .unwrap()
}

fn reference_financing() -> FinancingParameters {
    serde_json::from_value(json!({
        "down_payment_dollars": "80000",
        "annual_rate_percent": "6.5",
        "loan_term_years": 30,
        "annual_insurance": "1200",
        "misc_monthly": "50"
    }))
    .unwrap()
}

// ===========================================================================
// Wire format
// ===========================================================================

#[test]
fn test_inputs_deserialize_with_defaults_applied() {
    let financing = reference_financing();
    // Unlisted knobs fall back to the documented defaults.
    assert_eq!(financing.vacancy_rate_pct, dec!(5.0));
    assert_eq!(financing.maintenance_pct, dec!(1.0));
    assert_eq!(financing.investment_horizon_years, 5);
    assert!(!financing.use_dynamic_capex);
}

#[test]
fn test_output_carries_the_contract_field_names() {
    let output = calculate_cashflow(
        &reference_property(),
        &reference_financing(),
        &ReserveTables::default(),
    )
    .unwrap();
    let value = serde_json::to_value(&output.result).unwrap();

    for field in [
        "loan_amount",
        "down_payment_percentage",
        "monthly_p_and_i",
        "monthly_taxes",
        "monthly_insurance",
        "effective_rent_after_vacancy",
        "monthly_property_mgmt",
        "monthly_maintenance",
        "monthly_capex",
        "total_monthly_expenses",
        "net_monthly_cashflow",
        "annual_cashflow",
        "cash_on_cash_roi",
    ] {
        assert!(
            value.get(field).is_some(),
            "output is missing contract field '{}'",
            field
        );
    }

    // Decimal fields travel as strings on the wire.
    assert_eq!(value["loan_amount"], json!("320000"));
}

// ===========================================================================
// Mode behavior
// ===========================================================================

#[test]
fn test_dynamic_total_includes_every_reserve_line() {
    let mut financing = reference_financing();
    financing.use_dynamic_capex = true;
    financing.property_mgmt_fee_pct = dec!(8);
    financing.utilities_monthly = dec!(120);

    let output = calculate_cashflow(
        &reference_property(),
        &financing,
        &ReserveTables::default(),
    )
    .unwrap();
    let f = &output.result;

    assert_eq!(
        f.total_monthly_expenses,
        f.monthly_p_and_i
            + f.monthly_taxes
            + f.monthly_insurance
            + f.misc_monthly
            + f.monthly_property_mgmt
            + f.monthly_maintenance
            + f.monthly_capex
            + f.utilities_monthly
    );
    assert_eq!(f.utilities_monthly, dec!(120));
    assert!(f.annual_noi.is_some());
    assert!(f.cap_rate.is_some());
}

#[test]
fn test_flat_and_dynamic_agree_on_debt_service() {
    let mut dynamic_financing = reference_financing();
    dynamic_financing.use_dynamic_capex = true;

    let flat = calculate_cashflow(
        &reference_property(),
        &reference_financing(),
        &ReserveTables::default(),
    )
    .unwrap();
    let dynamic = calculate_cashflow(
        &reference_property(),
        &dynamic_financing,
        &ReserveTables::default(),
    )
    .unwrap();

    assert_eq!(
        flat.result.monthly_p_and_i,
        dynamic.result.monthly_p_and_i
    );
    assert_eq!(flat.result.loan_amount, dynamic.result.loan_amount);
    // Dynamic mode always carries more expense lines.
    assert!(dynamic.result.total_monthly_expenses > flat.result.total_monthly_expenses);
}

// ===========================================================================
// Tax text handling
// ===========================================================================

#[test]
fn test_tax_text_variants() {
    let cases = [
        ("$4,800 / Annually", dec!(400)),
        ("4800", dec!(400)),
        ("Annual taxes: $3,600 (2023)", dec!(300)),
        ("Tax amount was 2,400.00 last year", dec!(200)),
    ];
    for (raw, expected_monthly) in cases {
        let mut property = reference_property();
        property.tax_info_raw = Some(raw.to_string());
        let output = calculate_cashflow(
            &property,
            &reference_financing(),
            &ReserveTables::default(),
        )
        .unwrap();
        assert_eq!(
            output.result.monthly_taxes, expected_monthly,
            "tax text {:?} parsed wrong",
            raw
        );
    }
}

#[test]
fn test_explicit_zero_rent_does_not_warn() {
    let mut property = reference_property();
    property.estimated_monthly_rent = Some(Decimal::ZERO);
    let output = calculate_cashflow(
        &property,
        &reference_financing(),
        &ReserveTables::default(),
    )
    .unwrap();
    assert!(!output.warnings.iter().any(|w| w.contains("rent")));

    property.estimated_monthly_rent = None;
    let output = calculate_cashflow(
        &property,
        &reference_financing(),
        &ReserveTables::default(),
    )
    .unwrap();
    assert!(output.warnings.iter().any(|w| w.contains("rent missing")));
}
