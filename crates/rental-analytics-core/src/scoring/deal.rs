use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentalAnalyticsResult;

// Empirical raw-score range: best case 2.5+2.5+2.0+2.0, worst -2.5-1.5-2.0-1.0.
const SCORE_RAW_MIN: Decimal = dec!(-7);
const SCORE_RAW_MAX: Decimal = dec!(9);
const SCORE_SCALE: Decimal = dec!(10);

const CAP_RATE_OFF_LABEL: &str = "N/A (dynamic CapEx off or unavailable)";

/// Metrics the scorer consumes, as produced by the cashflow and
/// appreciation operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealScoreInput {
    pub net_monthly_cashflow: Money,
    pub cash_on_cash_roi: Percent,
    #[serde(default)]
    pub cap_rate: Option<Percent>,
    pub annualized_roi_on_equity: Percent,
    #[serde(default)]
    pub use_dynamic_capex: bool,
}

/// One scored metric: the input value, its bucket score, and the bucket label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    pub score: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealScore {
    pub cashflow: MetricScore,
    pub cash_on_cash: MetricScore,
    pub cap_rate: MetricScore,
    pub annualized_roi: MetricScore,
    pub raw_score: Decimal,
    pub normalized_score: Decimal,
    pub rating: String,
    pub highlights: Vec<String>,
}

/// Bucket the four headline metrics, sum, and normalize onto 0-10.
pub fn score_deal(input: &DealScoreInput) -> RentalAnalyticsResult<ComputationOutput<DealScore>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let (cf_score, cf_label) = score_cashflow(input.net_monthly_cashflow);
    let (coc_score, coc_label) = score_cash_on_cash(input.cash_on_cash_roi);
    let (cap_score, cap_label) = match (input.use_dynamic_capex, input.cap_rate) {
        (true, Some(cap)) => score_cap_rate(cap),
        _ => (Decimal::ZERO, CAP_RATE_OFF_LABEL),
    };
    let (roi_score, roi_label) = score_annualized_roi(input.annualized_roi_on_equity);

    let raw_score = cf_score + coc_score + cap_score + roi_score;
    let normalized_score = ((raw_score - SCORE_RAW_MIN) / (SCORE_RAW_MAX - SCORE_RAW_MIN)
        * SCORE_SCALE)
        .clamp(Decimal::ZERO, SCORE_SCALE);
    let rating = overall_rating(normalized_score);

    let highlights = vec![
        format!("Net monthly cashflow: {}", cf_label.to_lowercase()),
        format!("Cash-on-cash ROI: {}", coc_label.to_lowercase()),
        format!("Cap rate: {}", cap_label.to_lowercase()),
        format!("Long-term total returns: {}", roi_label.to_lowercase()),
    ];

    let result = DealScore {
        cashflow: MetricScore {
            value: Some(input.net_monthly_cashflow),
            score: cf_score,
            label: cf_label.to_string(),
        },
        cash_on_cash: MetricScore {
            value: Some(input.cash_on_cash_roi),
            score: coc_score,
            label: coc_label.to_string(),
        },
        cap_rate: MetricScore {
            value: input.cap_rate.filter(|_| input.use_dynamic_capex),
            score: cap_score,
            label: cap_label.to_string(),
        },
        annualized_roi: MetricScore {
            value: Some(input.annualized_roi_on_equity),
            score: roi_score,
            label: roi_label.to_string(),
        },
        raw_score,
        normalized_score,
        rating: rating.to_string(),
        highlights,
    };

    let assumptions = json!({
        "raw_score_range": [SCORE_RAW_MIN, SCORE_RAW_MAX],
        "normalized_scale": SCORE_SCALE,
        "cap_rate_scored": input.use_dynamic_capex && input.cap_rate.is_some(),
    });

    Ok(with_metadata(
        "Bucketed metric scoring normalized onto a 0-10 investment scale",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

fn score_cashflow(monthly: Money) -> (Decimal, &'static str) {
    if monthly > dec!(300) {
        (dec!(2.5), "Excellent")
    } else if monthly > dec!(100) {
        (dec!(1.5), "Good")
    } else if monthly > Decimal::ZERO {
        (dec!(0.5), "Fair")
    } else if monthly == Decimal::ZERO {
        (Decimal::ZERO, "Neutral")
    } else if monthly > dec!(-100) {
        (dec!(-0.5), "Poor")
    } else if monthly > dec!(-300) {
        (dec!(-1.5), "Very Poor")
    } else {
        (dec!(-2.5), "Extremely Poor")
    }
}

fn score_cash_on_cash(coc: Percent) -> (Decimal, &'static str) {
    if coc > dec!(12) {
        (dec!(2.5), "Excellent")
    } else if coc > dec!(8) {
        (dec!(1.5), "Good")
    } else if coc > dec!(5) {
        (dec!(0.5), "Fair")
    } else if coc > dec!(2) {
        (Decimal::ZERO, "Neutral")
    } else if coc >= Decimal::ZERO {
        (dec!(-0.5), "Poor")
    } else {
        (dec!(-1.5), "Very Poor")
    }
}

fn score_cap_rate(cap: Percent) -> (Decimal, &'static str) {
    if cap > dec!(7) {
        (dec!(2.0), "Excellent")
    } else if cap > dec!(5.5) {
        (dec!(1.0), "Good")
    } else if cap > dec!(4) {
        (Decimal::ZERO, "Fair")
    } else if cap > dec!(2.5) {
        (dec!(-1.0), "Poor")
    } else {
        (dec!(-2.0), "Very Poor")
    }
}

fn score_annualized_roi(roi: Percent) -> (Decimal, &'static str) {
    if roi > dec!(15) {
        (dec!(2.0), "Excellent")
    } else if roi > dec!(10) {
        (dec!(1.0), "Good")
    } else if roi > dec!(7) {
        (dec!(0.5), "Fair")
    } else if roi > dec!(4) {
        (Decimal::ZERO, "Neutral")
    } else if roi >= Decimal::ZERO {
        (dec!(-0.5), "Poor")
    } else {
        (dec!(-1.0), "Very Poor")
    }
}

fn overall_rating(normalized: Decimal) -> &'static str {
    if normalized >= dec!(8.5) {
        "Excellent Investment Prospect!"
    } else if normalized >= dec!(6.5) {
        "Good Investment Prospect"
    } else if normalized >= dec!(4.0) {
        "Fair Investment Prospect, Potential Upsides"
    } else if normalized >= dec!(2.0) {
        "Marginal Investment, Consider Carefully"
    } else {
        "Poor Investment Prospect"
    }
}
