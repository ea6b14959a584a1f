//! Daily per-channel rollup of annotated marketing rows.

use adspend_core::types::{AnnotatedMarketingRecord, DailyChannelSummary, EfficiencyRatios, MediaVolume};
use adspend_core::Channel;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::efficiency::safe_div;

#[derive(Default)]
struct DailyAccumulator {
    volume: MediaVolume,
    ratio_sums: EfficiencyRatios,
    rows: usize,
}

impl DailyAccumulator {
    fn push(&mut self, row: &AnnotatedMarketingRecord) {
        self.volume.accumulate(&row.record.volume);
        self.ratio_sums.ctr += row.ratios.ctr;
        self.ratio_sums.cpc += row.ratios.cpc;
        self.ratio_sums.cpm += row.ratios.cpm;
        self.ratio_sums.roas += row.ratios.roas;
        self.rows += 1;
    }

    /// Ratios are averaged per row, not re-derived from the summed volumes.
    fn mean_ratios(&self) -> EfficiencyRatios {
        let n = self.rows as f64;
        EfficiencyRatios {
            ctr: safe_div(self.ratio_sums.ctr, n),
            cpc: safe_div(self.ratio_sums.cpc, n),
            cpm: safe_div(self.ratio_sums.cpm, n),
            roas: safe_div(self.ratio_sums.roas, n),
        }
    }
}

/// Group by (date, channel): volumes are summed, ratios are averaged.
///
/// Only pairs present in the input produce a summary. Output is ordered by
/// date, then channel.
pub fn aggregate_daily(rows: &[AnnotatedMarketingRecord]) -> Vec<DailyChannelSummary> {
    let mut groups: BTreeMap<(NaiveDate, Channel), DailyAccumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.record.date, row.record.channel))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((date, channel), acc)| DailyChannelSummary {
            date,
            channel,
            volume: acc.volume,
            ratios: acc.mean_ratios(),
        })
        .collect()
}
