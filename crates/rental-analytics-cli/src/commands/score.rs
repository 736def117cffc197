use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::scoring::deal::{self, DealScoreInput};

use crate::commands::read_document;

/// Arguments for deal scoring
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to a JSON or YAML input file with deal metrics
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly cashflow (dollars)
    #[arg(long, allow_hyphen_values = true)]
    pub net_monthly_cashflow: Option<Decimal>,

    /// Cash-on-cash ROI (%)
    #[arg(long, allow_hyphen_values = true)]
    pub cash_on_cash_roi: Option<Decimal>,

    /// Cap rate (%); scored only together with --use-dynamic-capex
    #[arg(long, allow_hyphen_values = true)]
    pub cap_rate: Option<Decimal>,

    /// Annualized ROI on equity (%)
    #[arg(long, allow_hyphen_values = true)]
    pub annualized_roi: Option<Decimal>,

    /// Treat the cap rate as computed from dynamic reserves
    #[arg(long)]
    pub use_dynamic_capex: bool,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let score_input: DealScoreInput = match read_document(args.input.as_deref())? {
        Some(doc) => serde_json::from_value(doc)?,
        None => DealScoreInput {
            net_monthly_cashflow: args
                .net_monthly_cashflow
                .ok_or("--net-monthly-cashflow is required (or provide --input)")?,
            cash_on_cash_roi: args
                .cash_on_cash_roi
                .ok_or("--cash-on-cash-roi is required (or provide --input)")?,
            cap_rate: args.cap_rate,
            annualized_roi_on_equity: args
                .annualized_roi
                .ok_or("--annualized-roi is required (or provide --input)")?,
            use_dynamic_capex: args.use_dynamic_capex,
        },
    };

    let output = deal::score_deal(&score_input)?;
    Ok(serde_json::to_value(output)?)
}
