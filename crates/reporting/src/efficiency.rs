//! Per-record efficiency metrics for marketing and business tables.

use adspend_core::types::{
    AnnotatedBusinessRecord, AnnotatedMarketingRecord, BusinessRecord, EfficiencyRatios,
    MarketingRecord, MediaVolume,
};

/// `value / divisor`, or 0 when the divisor is 0 or the quotient is not finite.
///
/// Every derived ratio in the pipeline goes through this function, so no
/// NaN or infinity ever reaches an output table.
pub fn safe_div(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        return 0.0;
    }
    let quotient = value / divisor;
    let out = if quotient.is_finite() { quotient } else { 0.0 };
    debug_assert!(out.is_finite());
    out
}

/// Arithmetic mean, 0 for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    safe_div(sum, count as f64)
}

/// CTR, CPC, CPM and ROAS of a single set of volumes.
pub fn efficiency_ratios(volume: &MediaVolume) -> EfficiencyRatios {
    EfficiencyRatios {
        ctr: safe_div(volume.clicks, volume.impressions),
        cpc: safe_div(volume.spend, volume.clicks),
        cpm: safe_div(1000.0 * volume.spend, volume.impressions),
        roas: safe_div(volume.attributed_revenue, volume.spend),
    }
}

pub fn derive_marketing_metrics(
    records: impl IntoIterator<Item = MarketingRecord>,
) -> Vec<AnnotatedMarketingRecord> {
    records
        .into_iter()
        .map(|record| AnnotatedMarketingRecord {
            ratios: efficiency_ratios(&record.volume),
            record,
        })
        .collect()
}

pub fn derive_business_metrics(
    records: impl IntoIterator<Item = BusinessRecord>,
) -> Vec<AnnotatedBusinessRecord> {
    records
        .into_iter()
        .map(|record| AnnotatedBusinessRecord {
            gross_margin: safe_div(record.gross_profit, record.total_revenue),
            aov: safe_div(record.total_revenue, record.order_count),
            record,
        })
        .collect()
}
