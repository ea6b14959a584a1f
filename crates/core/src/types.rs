use crate::channels::Channel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily business outcomes. Exactly one record per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub order_count: f64,
    pub new_customers: f64,
}

/// A business record with its derived efficiency metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBusinessRecord {
    pub record: BusinessRecord,
    /// `gross_profit / total_revenue`, 0 when revenue is 0.
    pub gross_margin: f64,
    /// `total_revenue / order_count`, 0 when there are no orders.
    pub aov: f64,
}

/// Volume and flow counters shared by raw, aggregated and joined marketing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaVolume {
    pub impressions: f64,
    pub clicks: f64,
    pub spend: f64,
    pub attributed_revenue: f64,
}

impl MediaVolume {
    pub fn accumulate(&mut self, other: &MediaVolume) {
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.spend += other.spend;
        self.attributed_revenue += other.attributed_revenue;
    }
}

/// Efficiency ratios. Never NaN or infinite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRatios {
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub roas: f64,
}

/// One row of a channel's spend/performance export, tagged with the channel
/// it was ingested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingRecord {
    pub date: NaiveDate,
    pub channel: Channel,
    pub volume: MediaVolume,
    pub campaign: String,
    pub tactic: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedMarketingRecord {
    pub record: MarketingRecord,
    pub ratios: EfficiencyRatios,
}

/// Per (date, channel) reduction of marketing rows. Volumes are summed,
/// ratios are the mean of the per-row ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChannelSummary {
    pub date: NaiveDate,
    pub channel: Channel,
    pub volume: MediaVolume,
    pub ratios: EfficiencyRatios,
}

/// A channel's column group inside a [`CombinedRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPerformance {
    pub volume: MediaVolume,
    pub ratios: EfficiencyRatios,
    /// Channel spend over the day's business new-customer count.
    pub cac: f64,
}

/// Business outcomes joined with every channel's daily performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub order_count: f64,
    pub new_customers: f64,
    pub gross_margin: f64,
    pub aov: f64,
    /// Indexed by [`Channel::index`].
    pub channels: [ChannelPerformance; Channel::COUNT],
    pub total_spend: f64,
    pub total_attributed_revenue: f64,
    pub total_roas: f64,
    pub total_cac: f64,
}

impl CombinedRecord {
    pub fn channel(&self, channel: Channel) -> &ChannelPerformance {
        &self.channels[channel.index()]
    }

    pub fn total_impressions(&self) -> f64 {
        self.channels.iter().map(|c| c.volume.impressions).sum()
    }

    pub fn total_clicks(&self) -> f64 {
        self.channels.iter().map(|c| c.volume.clicks).sum()
    }
}
