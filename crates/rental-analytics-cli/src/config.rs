use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use rental_analytics_core::appreciation::resolver::{NeighborhoodRateConfig, RateResolverInput};
use rental_analytics_core::{FinancingParameters, PropertyFinancialInput};

use crate::input;

const DEFAULT_SQUARE_FEET: Decimal = dec!(1400);
const DEFAULT_PROPERTY_AGE: u32 = 20;
const DEFAULT_PROPERTY_CONDITION: &str = "good";

/// Analysis defaults loaded from a JSON or YAML config file.
///
/// Every field is optional so the merge precedence stays visible: built-in
/// default, then config file, then explicit CLI flag. Percentages use the
/// same listing-style convention as the engine (5.0 means 5%).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub down_payment: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub loan_term: Option<u32>,
    pub insurance: Option<Decimal>,
    pub misc_monthly: Option<Decimal>,
    pub vacancy_rate: Option<Decimal>,
    pub property_mgmt_fee: Option<Decimal>,
    pub maintenance_percent: Option<Decimal>,
    pub capex_percent: Option<Decimal>,
    pub utilities_monthly: Option<Decimal>,
    pub property_age: Option<u32>,
    pub property_condition: Option<String>,
    pub square_feet: Option<Decimal>,
    pub use_dynamic_capex: Option<bool>,
    pub investment_horizon: Option<u32>,
    /// Fallback appreciation rate when no higher tier resolves one.
    pub appreciation_rate: Option<Decimal>,
    pub fetch_real_appreciation: Option<bool>,
    pub use_historical_metric: Option<String>,
    pub target_city: Option<String>,
    pub neighborhood: Option<String>,
    pub zip_to_neighborhood_mapping: BTreeMap<String, String>,
    pub neighborhood_appreciation_data: NeighborhoodRateConfig,
}

/// Load the analysis config, or pure defaults when no path was given.
pub fn load(path: Option<&str>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => input::file::read_document(p),
        None => Ok(AnalysisConfig::default()),
    }
}

impl AnalysisConfig {
    /// Financing parameters with config values layered over the built-in
    /// defaults.
    pub fn financing(&self) -> FinancingParameters {
        let mut financing = FinancingParameters::default();
        if let Some(v) = self.down_payment {
            financing.down_payment_dollars = v;
        }
        if let Some(v) = self.rate {
            financing.annual_rate_percent = v;
        }
        if let Some(v) = self.loan_term {
            financing.loan_term_years = v;
        }
        if let Some(v) = self.insurance {
            financing.annual_insurance = v;
        }
        if let Some(v) = self.misc_monthly {
            financing.misc_monthly = v;
        }
        if let Some(v) = self.vacancy_rate {
            financing.vacancy_rate_pct = v;
        }
        if let Some(v) = self.property_mgmt_fee {
            financing.property_mgmt_fee_pct = v;
        }
        if let Some(v) = self.maintenance_percent {
            financing.maintenance_pct = v;
        }
        if let Some(v) = self.capex_percent {
            financing.capex_pct = v;
        }
        if let Some(v) = self.utilities_monthly {
            financing.utilities_monthly = v;
        }
        if let Some(v) = self.use_dynamic_capex {
            financing.use_dynamic_capex = v;
        }
        if let Some(v) = self.investment_horizon {
            financing.investment_horizon_years = v;
        }
        financing
    }

    /// Rate resolver input with config values layered over the built-in
    /// defaults. The config-level `appreciation_rate` feeds the fallback
    /// tier; a manual override only ever comes from an explicit flag.
    pub fn resolver(&self) -> RateResolverInput {
        let mut resolver = RateResolverInput::default();
        if let Some(v) = self.fetch_real_appreciation {
            resolver.use_historical = v;
        }
        if let Some(ref metric) = self.use_historical_metric {
            resolver.metric = metric.clone();
        }
        if let Some(ref city) = self.target_city {
            resolver.city = Some(city.clone());
        }
        if let Some(v) = self.appreciation_rate {
            resolver.fallback_rate = v;
        }
        resolver.neighborhood_config = self.neighborhood_appreciation_data.clone();
        resolver
    }

    /// Fill property gaps the config (or the built-in defaults) can cover.
    /// Values already on the record are left alone.
    pub fn fill_property_gaps(&self, property: &mut PropertyFinancialInput) {
        if property.square_feet.is_none() {
            property.square_feet = Some(self.square_feet.unwrap_or(DEFAULT_SQUARE_FEET));
        }
        if property.property_age.is_none() {
            property.property_age = Some(self.property_age.unwrap_or(DEFAULT_PROPERTY_AGE));
        }
        if property.property_condition.is_none() {
            property.property_condition = Some(
                self.property_condition
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROPERTY_CONDITION.to_string()),
            );
        }
    }

    /// Neighborhood determination: explicit value, else the ZIP mapping,
    /// else the config-wide neighborhood.
    pub fn infer_neighborhood(&self, explicit: Option<&str>, zip: Option<&str>) -> Option<String> {
        if let Some(name) = explicit {
            return Some(name.to_string());
        }
        if let Some(zip) = zip {
            if let Some(name) = self.zip_to_neighborhood_mapping.get(zip) {
                return Some(name.clone());
            }
        }
        self.neighborhood.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_yields_engine_defaults() {
        let config = AnalysisConfig::default();
        let financing = config.financing();
        assert_eq!(financing.loan_term_years, 30);
        assert_eq!(financing.vacancy_rate_pct, dec!(5.0));
        assert!(!financing.use_dynamic_capex);

        let resolver = config.resolver();
        assert!(!resolver.use_historical);
        assert_eq!(resolver.fallback_rate, Decimal::ZERO);
    }

    #[test]
    fn test_config_values_layer_over_defaults() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{
                "down_payment": "80000",
                "rate": "6.5",
                "vacancy_rate": "7.5",
                "use_dynamic_capex": true,
                "appreciation_rate": "3.0",
                "fetch_real_appreciation": true
            }"#,
        )
        .unwrap();

        let financing = config.financing();
        assert_eq!(financing.down_payment_dollars, dec!(80000));
        assert_eq!(financing.annual_rate_percent, dec!(6.5));
        assert_eq!(financing.vacancy_rate_pct, dec!(7.5));
        assert_eq!(financing.loan_term_years, 30);
        assert!(financing.use_dynamic_capex);

        let resolver = config.resolver();
        assert!(resolver.use_historical);
        assert_eq!(resolver.fallback_rate, dec!(3.0));
    }

    #[test]
    fn test_yaml_config_parses_numbers_and_maps() {
        let config: AnalysisConfig = serde_yaml::from_str(
            "down_payment: 60000\n\
             square_feet: 1650\n\
             zip_to_neighborhood_mapping:\n\
             \x20 \"80212\": Berkeley\n\
             neighborhood_appreciation_data:\n\
             \x20 Berkeley:\n\
             \x20   historical_appreciation: \"5.2\"\n\
             \x20   long_term_outlook: appreciating\n",
        )
        .unwrap();

        assert_eq!(config.down_payment, Some(dec!(60000)));
        assert_eq!(config.square_feet, Some(dec!(1650)));
        assert_eq!(
            config.zip_to_neighborhood_mapping.get("80212"),
            Some(&"Berkeley".to_string())
        );
        let entry = config.neighborhood_appreciation_data.get("Berkeley").unwrap();
        assert_eq!(entry.historical_appreciation, Some(dec!(5.2)));
    }

    #[test]
    fn test_property_gaps_fill_from_config_then_builtins() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "square_feet": "1650" }"#).unwrap();
        let mut property = PropertyFinancialInput {
            property_age: Some(12),
            ..PropertyFinancialInput::default()
        };
        config.fill_property_gaps(&mut property);
        assert_eq!(property.square_feet, Some(dec!(1650)));
        assert_eq!(property.property_age, Some(12));
        assert_eq!(property.property_condition.as_deref(), Some("good"));
    }

    #[test]
    fn test_neighborhood_inference_order() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{
                "neighborhood": "Sunnyside",
                "zip_to_neighborhood_mapping": { "80212": "Berkeley" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.infer_neighborhood(Some("Sloan Lake"), Some("80212")),
            Some("Sloan Lake".to_string())
        );
        assert_eq!(
            config.infer_neighborhood(None, Some("80212")),
            Some("Berkeley".to_string())
        );
        assert_eq!(
            config.infer_neighborhood(None, Some("99999")),
            Some("Sunnyside".to_string())
        );
        assert_eq!(
            AnalysisConfig::default().infer_neighborhood(None, None),
            None
        );
    }
}
