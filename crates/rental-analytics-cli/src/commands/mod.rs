pub mod analyze;
pub mod batch;
pub mod cashflow;
pub mod rate;
pub mod reserves;
pub mod score;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::appreciation::resolver::{
    InMemoryMetricSource, NeighborhoodMetricRecord, RateResolverInput,
};
use rental_analytics_core::{FinancingParameters, PropertyFinancialInput};

use crate::input;

/// Property facts shared by the analyze and cashflow commands.
#[derive(Args)]
pub struct PropertyFlags {
    /// Full property address
    #[arg(long)]
    pub address: Option<String>,

    /// Purchase price (dollars)
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Estimated monthly rent (dollars)
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Raw listing tax text (e.g. "$4,800 / Annually")
    #[arg(long)]
    pub tax_info: Option<String>,

    /// Square footage
    #[arg(long)]
    pub square_feet: Option<Decimal>,

    /// Property age in years
    #[arg(long)]
    pub property_age: Option<u32>,

    /// Property condition: excellent, good, fair, or poor
    #[arg(long)]
    pub property_condition: Option<String>,

    /// ZIP code, used for neighborhood inference
    #[arg(long)]
    pub zip: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,
}

/// Financing and expense assumptions shared by the analyze and cashflow
/// commands.
#[derive(Args)]
pub struct FinancingFlags {
    /// Down payment amount (dollars)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate (e.g. 6.5 for 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Annual insurance cost
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Miscellaneous monthly costs
    #[arg(long)]
    pub misc_monthly: Option<Decimal>,

    /// Vacancy rate (%)
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Property management fee (% of collected rent)
    #[arg(long)]
    pub property_mgmt_fee: Option<Decimal>,

    /// Annual maintenance reserve (% of property value)
    #[arg(long)]
    pub maintenance_percent: Option<Decimal>,

    /// Annual CapEx reserve (% of property value)
    #[arg(long)]
    pub capex_percent: Option<Decimal>,

    /// Monthly utilities paid by the landlord
    #[arg(long)]
    pub utilities_monthly: Option<Decimal>,

    /// Use the per-component CapEx schedule instead of flat percentages
    #[arg(long)]
    pub use_dynamic_capex: bool,

    /// Investment holding period (years)
    #[arg(long)]
    pub investment_horizon: Option<u32>,
}

/// Appreciation-rate flags shared by the analyze and rate commands.
#[derive(Args)]
pub struct RateFlags {
    /// Manual annual appreciation rate (%), overriding every other tier
    #[arg(long, allow_hyphen_values = true)]
    pub appreciation_rate: Option<Decimal>,

    /// Neighborhood override; inferred from ZIP or config when omitted
    #[arg(long)]
    pub neighborhood: Option<String>,

    /// Resolve the rate from loaded historical metrics
    #[arg(long)]
    pub use_historical: bool,

    /// Historical metric name to resolve
    #[arg(long)]
    pub metric: Option<String>,

    /// Minimum homes sold for a metric record to count
    #[arg(long)]
    pub min_homes_sold: Option<u32>,

    /// City used to disambiguate neighborhoods in the metrics store
    #[arg(long)]
    pub target_city: Option<String>,

    /// Path to a JSON or YAML file of neighborhood metric records
    #[arg(long)]
    pub metrics_file: Option<String>,
}

pub(crate) fn apply_property_flags(property: &mut PropertyFinancialInput, flags: &PropertyFlags) {
    if let Some(ref v) = flags.address {
        property.address = Some(v.clone());
    }
    if let Some(v) = flags.price {
        property.purchase_price = v;
    }
    if let Some(v) = flags.rent {
        property.estimated_monthly_rent = Some(v);
    }
    if let Some(ref v) = flags.tax_info {
        property.tax_info_raw = Some(v.clone());
    }
    if let Some(v) = flags.square_feet {
        property.square_feet = Some(v);
    }
    if let Some(v) = flags.property_age {
        property.property_age = Some(v);
    }
    if let Some(ref v) = flags.property_condition {
        property.property_condition = Some(v.clone());
    }
    if let Some(ref v) = flags.zip {
        property.zip = Some(v.clone());
    }
    if let Some(ref v) = flags.city {
        property.city = Some(v.clone());
    }
}

pub(crate) fn apply_financing_flags(financing: &mut FinancingParameters, flags: &FinancingFlags) {
    if let Some(v) = flags.down_payment {
        financing.down_payment_dollars = v;
    }
    if let Some(v) = flags.rate {
        financing.annual_rate_percent = v;
    }
    if let Some(v) = flags.loan_term {
        financing.loan_term_years = v;
    }
    if let Some(v) = flags.insurance {
        financing.annual_insurance = v;
    }
    if let Some(v) = flags.misc_monthly {
        financing.misc_monthly = v;
    }
    if let Some(v) = flags.vacancy_rate {
        financing.vacancy_rate_pct = v;
    }
    if let Some(v) = flags.property_mgmt_fee {
        financing.property_mgmt_fee_pct = v;
    }
    if let Some(v) = flags.maintenance_percent {
        financing.maintenance_pct = v;
    }
    if let Some(v) = flags.capex_percent {
        financing.capex_pct = v;
    }
    if let Some(v) = flags.utilities_monthly {
        financing.utilities_monthly = v;
    }
    if flags.use_dynamic_capex {
        financing.use_dynamic_capex = true;
    }
    if let Some(v) = flags.investment_horizon {
        financing.investment_horizon_years = v;
    }
}

pub(crate) fn apply_rate_flags(resolver: &mut RateResolverInput, flags: &RateFlags) {
    if let Some(v) = flags.appreciation_rate {
        resolver.manual_rate = Some(v);
    }
    if let Some(ref v) = flags.neighborhood {
        resolver.neighborhood = Some(v.clone());
    }
    if flags.use_historical {
        resolver.use_historical = true;
    }
    if let Some(ref v) = flags.metric {
        resolver.metric = v.clone();
    }
    if let Some(v) = flags.min_homes_sold {
        resolver.min_homes_sold = v;
    }
    if let Some(ref v) = flags.target_city {
        resolver.city = Some(v.clone());
    }
}

/// Resolve the input document: `--input` file first, then piped stdin.
pub(crate) fn read_document(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(input::file::read_value(p)?)),
        None => input::stdin::read_stdin(),
    }
}

/// Load a metrics file (an array of neighborhood metric records) into an
/// in-memory historical source.
pub(crate) fn load_metric_source(
    path: Option<&str>,
) -> Result<Option<InMemoryMetricSource>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let records: Vec<NeighborhoodMetricRecord> = input::file::read_document(p)?;
            Ok(Some(InMemoryMetricSource::new(records)))
        }
        None => Ok(None),
    }
}
