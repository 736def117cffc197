use chrono::NaiveDate;
use rental_analytics_core::appreciation::projection::{project_appreciation, AppreciationInput};
use rental_analytics_core::appreciation::resolver::{
    resolve_rate, InMemoryMetricSource, NeighborhoodMetricRecord, NeighborhoodOutlook,
    RateResolverInput, RateTier, DEFAULT_HISTORICAL_METRIC, HISTORICAL_PROPERTY_TYPE,
};
use rental_analytics_core::mortgage;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn metric_source() -> InMemoryMetricSource {
    InMemoryMetricSource::new(vec![NeighborhoodMetricRecord {
        neighborhood: "Sloan Lake".to_string(),
        city: Some("Denver".to_string()),
        property_type: HISTORICAL_PROPERTY_TYPE.to_string(),
        homes_sold: 24,
        period_end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        metric: DEFAULT_HISTORICAL_METRIC.to_string(),
        value: dec!(6.8),
    }])
}

fn all_tiers_input() -> RateResolverInput {
    let mut input = RateResolverInput {
        neighborhood: Some("Sloan Lake".to_string()),
        city: Some("Denver".to_string()),
        manual_rate: Some(dec!(4)),
        use_historical: true,
        fallback_rate: dec!(3),
        ..RateResolverInput::default()
    };
    input.neighborhood_config.insert(
        "Sloan Lake".to_string(),
        NeighborhoodOutlook {
            historical_appreciation: Some(dec!(5.2)),
            long_term_outlook: Some("appreciating steadily".to_string()),
        },
    );
    input
}

// ===========================================================================
// Resolver precedence: drop one tier at a time
// ===========================================================================

#[test]
fn test_precedence_with_every_tier_populated() {
    let source = metric_source();
    let input = all_tiers_input();

    // All four present: only the manual value is used.
    let resolution = resolve_rate(&input, Some(&source));
    assert_eq!(resolution.tier, RateTier::ManualOverride);
    assert_eq!(resolution.annual_rate_percent, dec!(4));

    // Remove manual: the historical store wins.
    let mut input = input;
    input.manual_rate = None;
    let resolution = resolve_rate(&input, Some(&source));
    assert_eq!(resolution.tier, RateTier::HistoricalMetric);
    assert_eq!(resolution.annual_rate_percent, dec!(6.8));

    // Remove the store: static config wins.
    let resolution = resolve_rate(&input, None);
    assert_eq!(resolution.tier, RateTier::StaticConfig);
    assert_eq!(resolution.annual_rate_percent, dec!(5.2));
    assert_eq!(resolution.outlook, "appreciating steadily");

    // Remove config: the hardcoded fallback terminates the chain.
    input.neighborhood_config.clear();
    let resolution = resolve_rate(&input, None);
    assert_eq!(resolution.tier, RateTier::Fallback);
    assert_eq!(resolution.annual_rate_percent, dec!(3));
}

#[test]
fn test_no_match_in_store_advances_to_config() {
    let source = metric_source();
    let mut input = all_tiers_input();
    input.manual_rate = None;
    input.neighborhood = Some("Five Points".to_string());
    input.neighborhood_config.insert(
        "Five Points".to_string(),
        NeighborhoodOutlook {
            historical_appreciation: Some(dec!(4.4)),
            long_term_outlook: None,
        },
    );

    let resolution = resolve_rate(&input, Some(&source));
    assert_eq!(resolution.tier, RateTier::StaticConfig);
    assert_eq!(resolution.annual_rate_percent, dec!(4.4));
}

// ===========================================================================
// Projection: Scenario B reference numbers
// ===========================================================================

#[test]
fn test_five_year_projection_reference_case() {
    // 400k at 4%/yr for 5 years: 400000 * 1.04^5 = 486,661.16
    let input = AppreciationInput {
        purchase_price: dec!(400000),
        down_payment_dollars: dec!(80000),
        loan_amount: dec!(320000),
        annual_rate_percent: dec!(6.5),
        loan_term_years: 30,
        annual_cashflow: dec!(-871.44),
        investment_horizon_years: 5,
        appreciation_rate_percent: dec!(4),
        rate_source: "Manual Rate Override".to_string(),
        market_outlook: "manual_override".to_string(),
    };
    let output = project_appreciation(&input).unwrap();
    let result = &output.result;

    assert!(
        (result.future_value - dec!(486661)).abs() < dec!(1),
        "future value should be ~486,661, got {}",
        result.future_value
    );
    assert!((result.total_appreciation - dec!(86661)).abs() < dec!(1));
    assert_eq!(
        result.total_equity_at_horizon,
        result.initial_equity + result.equity_from_mortgage_paydown + result.total_appreciation
    );
    assert_eq!(result.source_of_data, "Manual Rate Override");
}

// ===========================================================================
// Amortization properties
// ===========================================================================

#[test]
fn test_balance_boundaries() {
    assert_eq!(
        mortgage::remaining_balance(dec!(320000), dec!(6.5), 30, 0),
        dec!(320000)
    );
    assert_eq!(
        mortgage::remaining_balance(dec!(320000), dec!(6.5), 30, 360),
        Decimal::ZERO
    );
    assert_eq!(
        mortgage::remaining_balance(dec!(320000), dec!(6.5), 30, 480),
        Decimal::ZERO
    );
}

#[test]
fn test_payments_cover_principal() {
    let cases = [
        (dec!(320000), dec!(6.5), 30u32),
        (dec!(100000), dec!(0), 15),
        (dec!(250000), dec!(3.25), 20),
        (dec!(50000), dec!(12), 10),
    ];
    for (principal, rate, term) in cases {
        let payment = mortgage::monthly_payment(principal, rate, term);
        let paid = payment * Decimal::from(term * 12);
        assert!(
            paid >= principal - dec!(0.01),
            "loan ({}, {}%, {}y) does not amortize: paid {} of {}",
            principal,
            rate,
            term,
            paid,
            principal
        );
    }
}
