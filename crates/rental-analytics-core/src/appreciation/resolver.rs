use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::{with_metadata, ComputationOutput, Percent};
use crate::RentalAnalyticsResult;

/// Metric used when the caller does not name one.
pub const DEFAULT_HISTORICAL_METRIC: &str = "median_sale_price_5_year_cagr_appreciation";

/// Property type the historical tier is restricted to.
pub const HISTORICAL_PROPERTY_TYPE: &str = "Single Family Residential";

/// Minimum observed transactions for a record to count as reliable.
pub const DEFAULT_MIN_HOMES_SOLD: u32 = 5;

/// The appreciation metrics a historical store can be asked for.
pub const KNOWN_HISTORICAL_METRICS: [&str; 12] = [
    "median_sale_price_ptp_appreciation",
    "median_ppsf_ptp_appreciation",
    "median_sale_price_quarterly_appreciation",
    "median_ppsf_quarterly_appreciation",
    "median_sale_price_annual_appreciation",
    "median_ppsf_annual_appreciation",
    "median_sale_price_3_year_cagr_appreciation",
    "median_ppsf_3_year_cagr_appreciation",
    "median_sale_price_5_year_cagr_appreciation",
    "median_ppsf_5_year_cagr_appreciation",
    "median_sale_price_10_year_cagr_appreciation",
    "median_ppsf_10_year_cagr_appreciation",
];

// ---------------------------------------------------------------------------
// Historical metric source
// ---------------------------------------------------------------------------

/// One observed metric value for a neighborhood over a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodMetricRecord {
    pub neighborhood: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub property_type: String,
    pub homes_sold: u32,
    pub period_end: NaiveDate,
    pub metric: String,
    pub value: Percent,
}

#[derive(Debug, Clone)]
pub struct MetricQuery<'a> {
    pub neighborhood: &'a str,
    pub city: Option<&'a str>,
    pub metric: &'a str,
    pub min_homes_sold: u32,
}

/// Read-only lookup into a historical-metrics store. Implementations own
/// the storage; the matching policy callers can rely on is the one
/// `InMemoryMetricSource` implements.
pub trait HistoricalMetricSource {
    fn lookup(&self, query: &MetricQuery<'_>) -> Option<Percent>;
}

/// In-memory metric store: exact neighborhood match first, then substring,
/// most recent period wins within each pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryMetricSource {
    pub records: Vec<NeighborhoodMetricRecord>,
}

impl InMemoryMetricSource {
    pub fn new(records: Vec<NeighborhoodMetricRecord>) -> Self {
        InMemoryMetricSource { records }
    }

    fn best_match(&self, query: &MetricQuery<'_>, exact: bool) -> Option<Percent> {
        let wanted = normalize_neighborhood(query.neighborhood);
        self.records
            .iter()
            .filter(|r| {
                r.metric == query.metric
                    && r.property_type == HISTORICAL_PROPERTY_TYPE
                    && r.homes_sold >= query.min_homes_sold
                    && city_matches(query.city, r.city.as_deref())
                    && name_matches(&wanted, &r.neighborhood, exact)
            })
            .max_by_key(|r| r.period_end)
            .map(|r| r.value)
    }
}

impl HistoricalMetricSource for InMemoryMetricSource {
    fn lookup(&self, query: &MetricQuery<'_>) -> Option<Percent> {
        self.best_match(query, true)
            .or_else(|| self.best_match(query, false))
    }
}

/// Case-, whitespace-, and underscore-insensitive neighborhood key.
pub fn normalize_neighborhood(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn city_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        Some(city) => actual.is_some_and(|a| a.eq_ignore_ascii_case(city)),
        None => true,
    }
}

fn name_matches(wanted: &str, actual: &str, exact: bool) -> bool {
    let actual = normalize_neighborhood(actual);
    if exact {
        actual == wanted
    } else {
        actual.contains(wanted)
    }
}

// ---------------------------------------------------------------------------
// Ordered tier resolution
// ---------------------------------------------------------------------------

/// Which tier produced the effective rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    ManualOverride,
    HistoricalMetric,
    StaticConfig,
    Fallback,
}

/// Static per-neighborhood appreciation entry, as loaded by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeighborhoodOutlook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_appreciation: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term_outlook: Option<String>,
}

/// Neighborhood key to appreciation entry. A "default" key acts as the
/// config tier's own fallback.
pub type NeighborhoodRateConfig = BTreeMap<String, NeighborhoodOutlook>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateResolverInput {
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub manual_rate: Option<Percent>,
    pub use_historical: bool,
    pub metric: String,
    pub min_homes_sold: u32,
    pub neighborhood_config: NeighborhoodRateConfig,
    pub fallback_rate: Percent,
}

impl Default for RateResolverInput {
    fn default() -> Self {
        RateResolverInput {
            neighborhood: None,
            city: None,
            manual_rate: None,
            use_historical: false,
            metric: DEFAULT_HISTORICAL_METRIC.to_string(),
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
            neighborhood_config: NeighborhoodRateConfig::new(),
            fallback_rate: Decimal::ZERO,
        }
    }
}

/// The effective annual appreciation rate and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResolution {
    pub annual_rate_percent: Percent,
    pub tier: RateTier,
    pub source: String,
    pub outlook: String,
}

/// Resolve the effective appreciation rate through the ordered tiers:
/// manual override, historical metric, static config, hardcoded fallback.
/// Always yields a rate; the fallback tier cannot fail.
pub fn resolve_rate(
    input: &RateResolverInput,
    source: Option<&dyn HistoricalMetricSource>,
) -> RateResolution {
    manual_tier(input)
        .or_else(|| historical_tier(input, source))
        .or_else(|| config_tier(input))
        .unwrap_or_else(|| fallback_tier(input))
}

/// `resolve_rate` wrapped in the standard output envelope.
pub fn resolve_appreciation_rate(
    input: &RateResolverInput,
    source: Option<&dyn HistoricalMetricSource>,
) -> RentalAnalyticsResult<ComputationOutput<RateResolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.use_historical && !KNOWN_HISTORICAL_METRICS.contains(&input.metric.as_str()) {
        warnings.push(format!(
            "Historical metric '{}' is not a known metric; historical tier skipped.",
            input.metric
        ));
    }
    if input.use_historical && source.is_none() {
        warnings.push(
            "Historical lookup enabled but no metric source provided; historical tier skipped."
                .to_string(),
        );
    }

    let resolution = resolve_rate(input, source);

    let assumptions = json!({
        "neighborhood": input.neighborhood,
        "city": input.city,
        "use_historical": input.use_historical,
        "metric": input.metric,
        "min_homes_sold": input.min_homes_sold,
        "config_entries": input.neighborhood_config.len(),
        "fallback_rate": input.fallback_rate,
    });

    Ok(with_metadata(
        "Ordered-tier appreciation rate resolution (manual, historical, config, fallback)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        resolution,
    ))
}

fn manual_tier(input: &RateResolverInput) -> Option<RateResolution> {
    input.manual_rate.map(|rate| RateResolution {
        annual_rate_percent: rate,
        tier: RateTier::ManualOverride,
        source: "Manual Rate Override".to_string(),
        outlook: "manual_override".to_string(),
    })
}

fn historical_tier(
    input: &RateResolverInput,
    source: Option<&dyn HistoricalMetricSource>,
) -> Option<RateResolution> {
    if !input.use_historical {
        return None;
    }
    if !KNOWN_HISTORICAL_METRICS.contains(&input.metric.as_str()) {
        return None;
    }
    let neighborhood = input.neighborhood.as_deref()?;
    let source = source?;

    let query = MetricQuery {
        neighborhood,
        city: input.city.as_deref(),
        metric: &input.metric,
        min_homes_sold: input.min_homes_sold,
    };
    source.lookup(&query).map(|rate| RateResolution {
        annual_rate_percent: rate,
        tier: RateTier::HistoricalMetric,
        source: format!("Historical metrics ({})", input.metric),
        outlook: "historical_db".to_string(),
    })
}

fn config_tier(input: &RateResolverInput) -> Option<RateResolution> {
    let config = &input.neighborhood_config;

    if let Some(name) = input.neighborhood.as_deref() {
        let candidates = [
            name.to_string(),
            name.replace('_', " "),
            name.replace(' ', "_"),
        ];
        for key in &candidates {
            if let Some(entry) = config.get(key) {
                if let Some(rate) = entry.historical_appreciation {
                    return Some(RateResolution {
                        annual_rate_percent: rate,
                        tier: RateTier::StaticConfig,
                        source: format!("Neighborhood config ('{}')", name),
                        outlook: entry
                            .long_term_outlook
                            .clone()
                            .unwrap_or_else(|| "N/A".to_string()),
                    });
                }
            }
        }
    }

    let default_entry = config.get("default")?;
    default_entry
        .historical_appreciation
        .map(|rate| RateResolution {
            annual_rate_percent: rate,
            tier: RateTier::StaticConfig,
            source: "Neighborhood config (default)".to_string(),
            outlook: default_entry
                .long_term_outlook
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        })
}

fn fallback_tier(input: &RateResolverInput) -> RateResolution {
    RateResolution {
        annual_rate_percent: input.fallback_rate,
        tier: RateTier::Fallback,
        source: format!("Hardcoded fallback ({}%)", input.fallback_rate),
        outlook: "hardcoded_fallback".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn record(
        neighborhood: &str,
        homes_sold: u32,
        period_end: NaiveDate,
        value: Decimal,
    ) -> NeighborhoodMetricRecord {
        NeighborhoodMetricRecord {
            neighborhood: neighborhood.to_string(),
            city: Some("Denver".to_string()),
            property_type: HISTORICAL_PROPERTY_TYPE.to_string(),
            homes_sold,
            period_end,
            metric: DEFAULT_HISTORICAL_METRIC.to_string(),
            value,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalization_folds_case_underscores_and_whitespace() {
        assert_eq!(normalize_neighborhood("Sloan_Lake"), "sloan lake");
        assert_eq!(normalize_neighborhood("  SLOAN   lake "), "sloan lake");
    }

    #[test]
    fn test_exact_match_beats_substring_match() {
        let source = InMemoryMetricSource::new(vec![
            record("Sloan Lake", 12, ymd(2024, 3, 31), dec!(6.1)),
            record("Greater Sloan Lake Area", 40, ymd(2024, 6, 30), dec!(9.9)),
        ]);
        let query = MetricQuery {
            neighborhood: "sloan_lake",
            city: Some("denver"),
            metric: DEFAULT_HISTORICAL_METRIC,
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
        };
        assert_eq!(source.lookup(&query), Some(dec!(6.1)));
    }

    #[test]
    fn test_substring_match_is_the_second_pass() {
        let source = InMemoryMetricSource::new(vec![record(
            "Denver, CO - Sloan Lake",
            12,
            ymd(2024, 3, 31),
            dec!(5.4),
        )]);
        let query = MetricQuery {
            neighborhood: "Sloan Lake",
            city: Some("Denver"),
            metric: DEFAULT_HISTORICAL_METRIC,
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
        };
        assert_eq!(source.lookup(&query), Some(dec!(5.4)));
    }

    #[test]
    fn test_unreliable_and_mistyped_records_are_ignored() {
        let thin = record("Sloan Lake", 3, ymd(2024, 6, 30), dec!(12.0));
        let mut condo = record("Sloan Lake", 25, ymd(2024, 6, 30), dec!(8.0));
        condo.property_type = "Condo/Co-op".to_string();
        let source = InMemoryMetricSource::new(vec![
            thin,
            condo,
            record("Sloan Lake", 25, ymd(2023, 12, 31), dec!(5.0)),
        ]);
        let query = MetricQuery {
            neighborhood: "Sloan Lake",
            city: None,
            metric: DEFAULT_HISTORICAL_METRIC,
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
        };
        assert_eq!(source.lookup(&query), Some(dec!(5.0)));
    }

    #[test]
    fn test_latest_period_wins() {
        let source = InMemoryMetricSource::new(vec![
            record("Sloan Lake", 20, ymd(2022, 12, 31), dec!(4.0)),
            record("Sloan Lake", 20, ymd(2024, 6, 30), dec!(6.0)),
            record("Sloan Lake", 20, ymd(2023, 6, 30), dec!(5.0)),
        ]);
        let query = MetricQuery {
            neighborhood: "Sloan Lake",
            city: None,
            metric: DEFAULT_HISTORICAL_METRIC,
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
        };
        assert_eq!(source.lookup(&query), Some(dec!(6.0)));
    }

    #[test]
    fn test_city_filter_applies_only_when_supplied() {
        let mut aurora = record("Sloan Lake", 20, ymd(2024, 6, 30), dec!(3.0));
        aurora.city = Some("Aurora".to_string());
        let source = InMemoryMetricSource::new(vec![aurora]);

        let denver_query = MetricQuery {
            neighborhood: "Sloan Lake",
            city: Some("Denver"),
            metric: DEFAULT_HISTORICAL_METRIC,
            min_homes_sold: DEFAULT_MIN_HOMES_SOLD,
        };
        assert_eq!(source.lookup(&denver_query), None);

        let anywhere_query = MetricQuery {
            city: None,
            ..denver_query
        };
        assert_eq!(source.lookup(&anywhere_query), Some(dec!(3.0)));
    }

    #[test]
    fn test_config_tier_tries_swapped_separators_then_default() {
        let mut config = NeighborhoodRateConfig::new();
        config.insert(
            "sloan lake".to_string(),
            NeighborhoodOutlook {
                historical_appreciation: Some(dec!(4.2)),
                long_term_outlook: Some("steady".to_string()),
            },
        );
        config.insert(
            "default".to_string(),
            NeighborhoodOutlook {
                historical_appreciation: Some(dec!(3.0)),
                long_term_outlook: None,
            },
        );

        let input = RateResolverInput {
            neighborhood: Some("sloan_lake".to_string()),
            neighborhood_config: config.clone(),
            ..RateResolverInput::default()
        };
        let resolution = resolve_rate(&input, None);
        assert_eq!(resolution.annual_rate_percent, dec!(4.2));
        assert_eq!(resolution.tier, RateTier::StaticConfig);
        assert_eq!(resolution.outlook, "steady");

        let unknown = RateResolverInput {
            neighborhood: Some("five points".to_string()),
            neighborhood_config: config,
            ..RateResolverInput::default()
        };
        let resolution = resolve_rate(&unknown, None);
        assert_eq!(resolution.annual_rate_percent, dec!(3.0));
        assert_eq!(resolution.source, "Neighborhood config (default)");
    }

    #[test]
    fn test_entry_without_a_rate_does_not_win() {
        let mut config = NeighborhoodRateConfig::new();
        config.insert(
            "sloan lake".to_string(),
            NeighborhoodOutlook {
                historical_appreciation: None,
                long_term_outlook: Some("unknown".to_string()),
            },
        );

        let input = RateResolverInput {
            neighborhood: Some("sloan lake".to_string()),
            neighborhood_config: config,
            ..RateResolverInput::default()
        };
        let resolution = resolve_rate(&input, None);
        assert_eq!(resolution.tier, RateTier::Fallback);
        assert_eq!(resolution.annual_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_metric_warns_and_falls_through() {
        let source = InMemoryMetricSource::new(vec![record(
            "Sloan Lake",
            20,
            ymd(2024, 6, 30),
            dec!(6.0),
        )]);
        let input = RateResolverInput {
            neighborhood: Some("Sloan Lake".to_string()),
            use_historical: true,
            metric: "median_wishful_thinking".to_string(),
            ..RateResolverInput::default()
        };
        let output = resolve_appreciation_rate(&input, Some(&source)).unwrap();
        assert_eq!(output.result.tier, RateTier::Fallback);
        assert!(output.warnings.iter().any(|w| w.contains("not a known metric")));
    }
}
