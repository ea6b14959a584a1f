//! Reporting reductions over the pipeline outputs: period KPIs with
//! period-over-period change, channel comparison and acquisition cost, and
//! campaign ranking.

use adspend_core::types::{AnnotatedMarketingRecord, CombinedRecord};
use adspend_core::Channel;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::efficiency::{mean, safe_div};

// ─── Period KPIs ────────────────────────────────────────────────────────────

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The full span covered by the combined table, if any.
    pub fn covering(combined: &[CombinedRecord]) -> Option<Self> {
        let start = combined.iter().map(|r| r.date).min()?;
        let end = combined.iter().map(|r| r.date).max()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The window immediately before this one, `end - start` days long.
    pub fn previous(&self) -> Self {
        let len = (self.end - self.start).num_days();
        Self {
            start: self.start - Duration::days(len),
            end: self.start - Duration::days(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub days: usize,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_orders: f64,
    pub gross_profit: f64,
    pub new_customers: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub avg_roas: f64,
    pub avg_cac: f64,
    pub avg_aov: f64,
    /// Clicks / impressions over the whole window.
    pub overall_ctr: f64,
    /// Spend / clicks over the whole window.
    pub overall_cpc: f64,
    /// Orders per 100 clicks.
    pub conversion_rate: f64,
}

impl PeriodSummary {
    pub fn compute(combined: &[CombinedRecord], range: &DateRange) -> Self {
        let rows: Vec<&CombinedRecord> =
            combined.iter().filter(|r| range.contains(r.date)).collect();

        let total_orders: f64 = rows.iter().map(|r| r.order_count).sum();
        let clicks: f64 = rows.iter().map(|r| r.total_clicks()).sum();
        let impressions: f64 = rows.iter().map(|r| r.total_impressions()).sum();
        let total_spend: f64 = rows.iter().map(|r| r.total_spend).sum();

        Self {
            days: rows.len(),
            total_spend,
            total_revenue: rows.iter().map(|r| r.total_revenue).sum(),
            total_orders,
            gross_profit: rows.iter().map(|r| r.gross_profit).sum(),
            new_customers: rows.iter().map(|r| r.new_customers).sum(),
            impressions,
            clicks,
            avg_roas: mean(rows.iter().map(|r| r.total_roas)),
            avg_cac: mean(rows.iter().map(|r| r.total_cac)),
            avg_aov: mean(rows.iter().map(|r| r.aov)),
            overall_ctr: safe_div(clicks, impressions),
            overall_cpc: safe_div(total_spend, clicks),
            conversion_rate: safe_div(total_orders, clicks) * 100.0,
        }
    }
}

/// Percent change from `previous` to `current`, 0 when there is no baseline.
pub fn period_change(current: f64, previous: f64) -> f64 {
    safe_div(current - previous, previous) * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current_range: DateRange,
    pub previous_range: DateRange,
    pub current: PeriodSummary,
    pub previous: PeriodSummary,
    pub spend_change: f64,
    pub revenue_change: f64,
    pub orders_change: f64,
    pub gross_profit_change: f64,
    pub new_customers_change: f64,
}

impl PeriodComparison {
    pub fn compute(combined: &[CombinedRecord], range: DateRange) -> Self {
        let previous_range = range.previous();
        let current = PeriodSummary::compute(combined, &range);
        let previous = PeriodSummary::compute(combined, &previous_range);
        Self {
            spend_change: period_change(current.total_spend, previous.total_spend),
            revenue_change: period_change(current.total_revenue, previous.total_revenue),
            orders_change: period_change(current.total_orders, previous.total_orders),
            gross_profit_change: period_change(current.gross_profit, previous.gross_profit),
            new_customers_change: period_change(current.new_customers, previous.new_customers),
            current_range: range,
            previous_range,
            current,
            previous,
        }
    }
}

// ─── Channel Comparison ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelComparison {
    pub channel: Channel,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub avg_roas: f64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
}

/// Per-channel totals and daily averages across the combined table.
pub fn channel_comparison(combined: &[CombinedRecord]) -> Vec<ChannelComparison> {
    Channel::ALL
        .iter()
        .map(|&channel| {
            let perf = || combined.iter().map(move |r| r.channel(channel));
            ChannelComparison {
                channel,
                total_spend: perf().map(|p| p.volume.spend).sum(),
                total_revenue: perf().map(|p| p.volume.attributed_revenue).sum(),
                avg_roas: mean(perf().map(|p| p.ratios.roas)),
                avg_ctr: mean(perf().map(|p| p.ratios.ctr)),
                avg_cpc: mean(perf().map(|p| p.ratios.cpc)),
            }
        })
        .collect()
}

// ─── Customer Acquisition ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAcquisition {
    pub channel: Channel,
    /// Mean of the daily per-channel CAC within the window.
    pub avg_cac: f64,
    pub total_spend: f64,
}

/// Per-channel acquisition cost over `range`, one entry per channel.
pub fn channel_acquisition(
    combined: &[CombinedRecord],
    range: &DateRange,
) -> Vec<ChannelAcquisition> {
    Channel::ALL
        .iter()
        .map(|&channel| {
            let perf = || {
                combined
                    .iter()
                    .filter(|r| range.contains(r.date))
                    .map(move |r| r.channel(channel))
            };
            ChannelAcquisition {
                channel,
                avg_cac: mean(perf().map(|p| p.cac)),
                total_spend: perf().map(|p| p.volume.spend).sum(),
            }
        })
        .collect()
}

// ─── Campaign Performance ───────────────────────────────────────────────────

/// Row filter for campaign analysis. An empty set accepts every value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignFilter {
    pub channels: BTreeSet<Channel>,
    pub tactics: BTreeSet<String>,
    pub states: BTreeSet<String>,
}

impl CampaignFilter {
    pub fn accepts(&self, row: &AnnotatedMarketingRecord) -> bool {
        let r = &row.record;
        (self.channels.is_empty() || self.channels.contains(&r.channel))
            && (self.tactics.is_empty() || self.tactics.contains(&r.tactic))
            && (self.states.is_empty() || self.states.contains(&r.state))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    pub campaign: String,
    pub channel: Channel,
    pub tactic: String,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub roas: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
}

/// Group by (campaign, channel, tactic), best ROAS first.
pub fn campaign_performance(
    marketing: &[AnnotatedMarketingRecord],
    filter: &CampaignFilter,
) -> Vec<CampaignPerformance> {
    let mut groups: BTreeMap<(&str, Channel, &str), Vec<&AnnotatedMarketingRecord>> =
        BTreeMap::new();
    for row in marketing.iter().filter(|r| filter.accepts(r)) {
        let key = (row.record.campaign.as_str(), row.record.channel, row.record.tactic.as_str());
        groups.entry(key).or_default().push(row);
    }

    let mut out: Vec<CampaignPerformance> = groups
        .into_iter()
        .map(|((campaign, channel, tactic), rows)| CampaignPerformance {
            campaign: campaign.to_string(),
            channel,
            tactic: tactic.to_string(),
            spend: rows.iter().map(|r| r.record.volume.spend).sum(),
            attributed_revenue: rows.iter().map(|r| r.record.volume.attributed_revenue).sum(),
            roas: mean(rows.iter().map(|r| r.ratios.roas)),
            ctr: mean(rows.iter().map(|r| r.ratios.ctr)),
            cpc: mean(rows.iter().map(|r| r.ratios.cpc)),
            cpm: mean(rows.iter().map(|r| r.ratios.cpm)),
        })
        .collect();

    // Groups arrive in key order, and the sort is stable, so ties keep it.
    out.sort_by(|a, b| b.roas.total_cmp(&a.roas));
    out
}

// ─── Run Summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub period: Option<PeriodComparison>,
    pub channels: Vec<ChannelComparison>,
    pub acquisition: Vec<ChannelAcquisition>,
    pub top_campaigns: Vec<CampaignPerformance>,
}

impl RunSummary {
    pub const TOP_CAMPAIGNS: usize = 10;

    /// Summaries for `range`, or for the whole combined span when `None`.
    pub fn compute(
        combined: &[CombinedRecord],
        marketing: &[AnnotatedMarketingRecord],
        range: Option<DateRange>,
    ) -> Self {
        let range = range.or_else(|| DateRange::covering(combined));
        let period = range.map(|r| PeriodComparison::compute(combined, r));
        let acquisition = range
            .map(|r| channel_acquisition(combined, &r))
            .unwrap_or_default();
        let mut top_campaigns = campaign_performance(marketing, &CampaignFilter::default());
        top_campaigns.truncate(Self::TOP_CAMPAIGNS);
        Self {
            period,
            channels: channel_comparison(combined),
            acquisition,
            top_campaigns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspend_core::types::{ChannelPerformance, EfficiencyRatios, MarketingRecord, MediaVolume};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn combined(day: u32, spend: f64, revenue: f64, orders: f64, clicks: f64) -> CombinedRecord {
        let mut channels = [ChannelPerformance::default(); Channel::COUNT];
        channels[Channel::Facebook.index()] = ChannelPerformance {
            volume: MediaVolume {
                impressions: clicks * 10.0,
                clicks,
                spend,
                attributed_revenue: spend * 2.0,
            },
            ratios: EfficiencyRatios {
                roas: 2.0,
                ctr: 0.1,
                cpc: safe_div(spend, clicks),
                cpm: 0.0,
            },
            cac: 0.0,
        };
        CombinedRecord {
            date: date(day),
            total_revenue: revenue,
            gross_profit: revenue * 0.4,
            order_count: orders,
            new_customers: 1.0,
            gross_margin: 0.4,
            aov: safe_div(revenue, orders),
            channels,
            total_spend: spend,
            total_attributed_revenue: spend * 2.0,
            total_roas: if spend > 0.0 { 2.0 } else { 0.0 },
            total_cac: spend,
        }
    }

    fn marketing(campaign: &str, channel: Channel, tactic: &str, state: &str, spend: f64, roas: f64) -> AnnotatedMarketingRecord {
        AnnotatedMarketingRecord {
            record: MarketingRecord {
                date: date(1),
                channel,
                volume: MediaVolume {
                    impressions: 100.0,
                    clicks: 10.0,
                    spend,
                    attributed_revenue: spend * roas,
                },
                campaign: campaign.into(),
                tactic: tactic.into(),
                state: state.into(),
            },
            ratios: EfficiencyRatios {
                ctr: 0.1,
                cpc: spend / 10.0,
                cpm: spend * 10.0,
                roas,
            },
        }
    }

    #[test]
    fn test_previous_window() {
        let range = DateRange::new(date(11), date(20));
        let prev = range.previous();
        assert_eq!(prev.start, date(2));
        assert_eq!(prev.end, date(10));
    }

    #[test]
    fn test_period_summary_sums_and_means() {
        let rows = vec![
            combined(1, 100.0, 1000.0, 10.0, 50.0),
            combined(2, 0.0, 500.0, 5.0, 0.0),
            combined(3, 999.0, 999.0, 99.0, 99.0),
        ];
        let summary = PeriodSummary::compute(&rows, &DateRange::new(date(1), date(2)));

        assert_eq!(summary.days, 2);
        assert!((summary.total_spend - 100.0).abs() < 1e-9);
        assert!((summary.total_revenue - 1500.0).abs() < 1e-9);
        assert!((summary.total_orders - 15.0).abs() < 1e-9);
        assert!((summary.clicks - 50.0).abs() < 1e-9);
        assert!((summary.avg_roas - 1.0).abs() < 1e-9);
        assert!((summary.avg_aov - 100.0).abs() < 1e-9);
        assert!((summary.conversion_rate - 30.0).abs() < 1e-9);
        // 50 clicks on 500 impressions, 100 spent.
        assert!((summary.overall_ctr - 0.1).abs() < 1e-9);
        assert!((summary.overall_cpc - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_is_all_zero() {
        let rows = vec![combined(1, 100.0, 1000.0, 10.0, 50.0)];
        let summary = PeriodSummary::compute(&rows, &DateRange::new(date(5), date(9)));
        assert_eq!(summary, PeriodSummary::default());
        assert_eq!(summary.overall_ctr, 0.0);
        assert_eq!(summary.overall_cpc, 0.0);
    }

    #[test]
    fn test_period_change() {
        assert!((period_change(150.0, 100.0) - 50.0).abs() < 1e-9);
        assert!((period_change(50.0, 100.0) + 50.0).abs() < 1e-9);
        assert_eq!(period_change(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_period_comparison() {
        let rows: Vec<CombinedRecord> = (1..=4)
            .map(|d| combined(d, 10.0 * d as f64, 100.0, 1.0, 1.0))
            .collect();
        let cmp = PeriodComparison::compute(&rows, DateRange::new(date(3), date(4)));
        // Previous window is a single day, Jan 2.
        assert_eq!(cmp.previous_range, DateRange::new(date(2), date(2)));
        assert!((cmp.current.total_spend - 70.0).abs() < 1e-9);
        assert!((cmp.previous.total_spend - 20.0).abs() < 1e-9);
        assert!((cmp.spend_change - 250.0).abs() < 1e-9);
        assert!((cmp.revenue_change - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_channel_comparison_covers_fixed_universe() {
        let rows = vec![combined(1, 100.0, 0.0, 0.0, 10.0), combined(2, 50.0, 0.0, 0.0, 10.0)];
        let cmp = channel_comparison(&rows);

        assert_eq!(cmp.len(), 3);
        assert_eq!(cmp[0].channel, Channel::Facebook);
        assert!((cmp[0].total_spend - 150.0).abs() < 1e-9);
        assert!((cmp[0].total_revenue - 300.0).abs() < 1e-9);
        assert!((cmp[0].avg_roas - 2.0).abs() < 1e-9);
        assert!((cmp[0].avg_cpc - 7.5).abs() < 1e-9);
        assert_eq!(cmp[2].channel, Channel::TikTok);
        assert_eq!(cmp[2].total_spend, 0.0);
        assert_eq!(cmp[2].avg_roas, 0.0);
    }

    #[test]
    fn test_channel_acquisition_over_window() {
        let mut rows = vec![
            combined(1, 100.0, 0.0, 0.0, 10.0),
            combined(2, 50.0, 0.0, 0.0, 10.0),
            combined(3, 999.0, 0.0, 0.0, 10.0),
        ];
        for (row, cac) in rows.iter_mut().zip([20.0, 10.0, 999.0]) {
            row.channels[Channel::Facebook.index()].cac = cac;
        }

        let acq = channel_acquisition(&rows, &DateRange::new(date(1), date(2)));
        assert_eq!(acq.len(), Channel::COUNT);
        assert_eq!(acq[0].channel, Channel::Facebook);
        assert!((acq[0].avg_cac - 15.0).abs() < 1e-9);
        assert!((acq[0].total_spend - 150.0).abs() < 1e-9);

        // No activity on Google in the window.
        assert_eq!(acq[1].channel, Channel::Google);
        assert_eq!(acq[1].avg_cac, 0.0);
        assert_eq!(acq[1].total_spend, 0.0);
    }

    #[test]
    fn test_channel_acquisition_empty_window() {
        let rows = vec![combined(1, 100.0, 0.0, 0.0, 10.0)];
        let acq = channel_acquisition(&rows, &DateRange::new(date(5), date(9)));
        assert_eq!(acq.len(), Channel::COUNT);
        assert!(acq.iter().all(|a| a.avg_cac == 0.0 && a.total_spend == 0.0));
    }

    #[test]
    fn test_campaign_ranking_and_filter() {
        let rows = vec![
            marketing("Spring", Channel::Facebook, "ASC", "NY", 100.0, 1.0),
            marketing("Spring", Channel::Facebook, "ASC", "CA", 100.0, 3.0),
            marketing("Brand", Channel::Google, "Search", "NY", 50.0, 4.0),
            marketing("Awareness", Channel::TikTok, "Video", "NY", 10.0, 0.5),
        ];

        let all = campaign_performance(&rows, &CampaignFilter::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].campaign, "Brand");
        assert_eq!(all[1].campaign, "Spring");
        assert!((all[1].spend - 200.0).abs() < 1e-9);
        assert!((all[1].roas - 2.0).abs() < 1e-9);
        assert!((all[1].attributed_revenue - 400.0).abs() < 1e-9);
        assert_eq!(all[2].campaign, "Awareness");

        let filter = CampaignFilter {
            states: ["CA".to_string()].into_iter().collect(),
            ..CampaignFilter::default()
        };
        let ca = campaign_performance(&rows, &filter);
        assert_eq!(ca.len(), 1);
        assert!((ca[0].roas - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_summary_defaults_to_full_span() {
        let rows = vec![combined(1, 10.0, 100.0, 1.0, 1.0), combined(5, 10.0, 100.0, 1.0, 1.0)];
        let summary = RunSummary::compute(&rows, &[], None);
        let period = summary.period.unwrap();
        assert_eq!(period.current_range, DateRange::new(date(1), date(5)));
        assert_eq!(period.current.days, 2);
        assert!(summary.top_campaigns.is_empty());
        assert_eq!(summary.acquisition.len(), Channel::COUNT);
        assert!((summary.acquisition[0].total_spend - 20.0).abs() < 1e-9);

        let empty = RunSummary::compute(&[], &[], None);
        assert!(empty.period.is_none());
        assert!(empty.acquisition.is_empty());
    }
}
