use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentage values as supplied by listings and market data (6.5 = 6.5%).
pub type Percent = Decimal;

/// Physical state of a property, as reported by a listing or an inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCondition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
}

impl PropertyCondition {
    /// Parse a free-form condition label. Returns None for anything
    /// outside the known set so callers can warn and fall back.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "excellent" => Some(PropertyCondition::Excellent),
            "good" => Some(PropertyCondition::Good),
            "fair" => Some(PropertyCondition::Fair),
            "poor" => Some(PropertyCondition::Poor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCondition::Excellent => "excellent",
            PropertyCondition::Good => "good",
            PropertyCondition::Fair => "fair",
            PropertyCondition::Poor => "poor",
        }
    }
}

/// Property-level facts needed for a financial analysis, as supplied by the
/// caller's property store. A missing purchase price deserializes to zero
/// and is rejected by every operation that needs one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFinancialInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub purchase_price: Money,
    pub tax_info_raw: Option<String>,
    pub estimated_monthly_rent: Option<Money>,
    pub square_feet: Option<Decimal>,
    pub property_age: Option<u32>,
    pub property_condition: Option<String>,
    pub neighborhood: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
}

/// Financing terms and expense assumptions for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingParameters {
    pub down_payment_dollars: Money,
    pub annual_rate_percent: Percent,
    pub loan_term_years: u32,
    pub annual_insurance: Money,
    pub misc_monthly: Money,
    pub vacancy_rate_pct: Percent,
    pub property_mgmt_fee_pct: Percent,
    pub maintenance_pct: Percent,
    pub capex_pct: Percent,
    pub utilities_monthly: Money,
    pub use_dynamic_capex: bool,
    pub investment_horizon_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_appreciation_rate: Option<Percent>,
}

impl Default for FinancingParameters {
    fn default() -> Self {
        FinancingParameters {
            down_payment_dollars: Decimal::ZERO,
            annual_rate_percent: Decimal::ZERO,
            loan_term_years: 30,
            annual_insurance: Decimal::ZERO,
            misc_monthly: Decimal::ZERO,
            vacancy_rate_pct: dec!(5.0),
            property_mgmt_fee_pct: Decimal::ZERO,
            maintenance_pct: dec!(1.0),
            capex_pct: dec!(1.0),
            utilities_monthly: Decimal::ZERO,
            use_dynamic_capex: false,
            investment_horizon_years: 5,
            manual_appreciation_rate: None,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_labels_round_trip() {
        for cond in [
            PropertyCondition::Excellent,
            PropertyCondition::Good,
            PropertyCondition::Fair,
            PropertyCondition::Poor,
        ] {
            assert_eq!(PropertyCondition::from_label(cond.as_str()), Some(cond));
        }
        assert_eq!(PropertyCondition::from_label("  Fair "), Some(PropertyCondition::Fair));
        assert_eq!(PropertyCondition::from_label("pristine"), None);
    }

    #[test]
    fn test_financing_defaults_match_reference_assumptions() {
        let f = FinancingParameters::default();
        assert_eq!(f.loan_term_years, 30);
        assert_eq!(f.vacancy_rate_pct, dec!(5.0));
        assert_eq!(f.maintenance_pct, dec!(1.0));
        assert_eq!(f.capex_pct, dec!(1.0));
        assert_eq!(f.investment_horizon_years, 5);
        assert!(!f.use_dynamic_capex);
    }

    #[test]
    fn test_missing_purchase_price_deserializes_to_zero() {
        let p: PropertyFinancialInput = serde_json::from_str("{}").unwrap();
        assert_eq!(p.purchase_price, Decimal::ZERO);
        assert!(p.estimated_monthly_rent.is_none());
    }
}
