use clap::Args;
use serde::Serialize;
use serde_json::Value;

use rental_analytics_core::analysis::{self, DealAnalysis};
use rental_analytics_core::appreciation::resolver::HistoricalMetricSource;
use rental_analytics_core::reserves::components::ReserveTables;

use crate::commands::{analyze, load_metric_source, read_document};
use crate::config::{self, AnalysisConfig};

/// Arguments for batch analysis
#[derive(Args)]
pub struct BatchArgs {
    /// Path to a JSON or YAML array of deal documents
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON or YAML config file with analysis defaults
    #[arg(long)]
    pub config: Option<String>,

    /// Path to a JSON or YAML file of neighborhood metric records
    #[arg(long)]
    pub metrics_file: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchItem {
    address: String,
    status: String,
    error: Option<String>,
    warnings: Vec<String>,
    analysis: Option<DealAnalysis>,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    total: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<BatchItem>,
}

/// Analyze every document in the array; a failing item is reported in
/// place without aborting the rest of the batch.
pub fn run_batch(args: BatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = config::load(args.config.as_deref())?;

    let items = match read_document(args.input.as_deref())? {
        Some(Value::Array(items)) => items,
        Some(_) => return Err("Batch input must be an array of deal documents".into()),
        None => return Err("--input file is required for batch analysis".into()),
    };

    let metrics = load_metric_source(args.metrics_file.as_deref())?;
    let source = metrics.as_ref().map(|m| m as &dyn HistoricalMetricSource);
    let tables = ReserveTables::default();

    let mut results: Vec<BatchItem> = Vec::with_capacity(items.len());
    let mut succeeded = 0usize;

    for (index, item) in items.into_iter().enumerate() {
        let address = item_address(&item, index);
        match analyze_one(item, &config, source, &tables) {
            Ok((warnings, item_analysis)) => {
                succeeded += 1;
                results.push(BatchItem {
                    address,
                    status: "ok".to_string(),
                    error: None,
                    warnings,
                    analysis: Some(item_analysis),
                });
            }
            Err(e) => results.push(BatchItem {
                address,
                status: "error".to_string(),
                error: Some(e.to_string()),
                warnings: Vec::new(),
                analysis: None,
            }),
        }
    }

    let output = BatchOutput {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    };
    Ok(serde_json::to_value(output)?)
}

/// Items are labeled by address when one is present anywhere on the
/// document, falling back to the array position.
fn item_address(item: &Value, index: usize) -> String {
    item.get("address")
        .or_else(|| item.get("property").and_then(|p| p.get("address")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("item {}", index + 1))
}

fn analyze_one(
    item: Value,
    config: &AnalysisConfig,
    source: Option<&dyn HistoricalMetricSource>,
    tables: &ReserveTables,
) -> Result<(Vec<String>, DealAnalysis), Box<dyn std::error::Error>> {
    let mut input = analyze::parse_document(item, config)?;
    analyze::finalize_input(&mut input, config);
    let output = analysis::analyze_deal(&input, source, tables)?;
    Ok((output.warnings, output.result))
}
