//! Long → wide reshape of daily channel summaries: one row per date, one
//! column group per channel of the fixed universe.

use adspend_core::types::{DailyChannelSummary, EfficiencyRatios, MediaVolume};
use adspend_core::{Channel, DuplicateKeyError};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One channel's column group on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelColumns {
    pub volume: MediaVolume,
    pub ratios: EfficiencyRatios,
}

/// Date-indexed wide table. A `None` slot means the channel had no activity
/// that day; the combiner fills those.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketingPivot {
    rows: BTreeMap<NaiveDate, [Option<ChannelColumns>; Channel::COUNT]>,
}

impl MarketingPivot {
    /// Index each channel's summaries by date and union the result.
    ///
    /// Fails when the same (date, channel) appears twice.
    pub fn build(summaries: &[DailyChannelSummary]) -> Result<Self, DuplicateKeyError> {
        let mut rows: BTreeMap<NaiveDate, [Option<ChannelColumns>; Channel::COUNT]> =
            BTreeMap::new();

        for channel in Channel::ALL {
            for summary in summaries.iter().filter(|s| s.channel == channel) {
                let slot = &mut rows.entry(summary.date).or_default()[channel.index()];
                if slot.is_some() {
                    return Err(DuplicateKeyError::new(
                        "daily_marketing",
                        format!("({}, {})", summary.date, channel),
                    ));
                }
                *slot = Some(ChannelColumns {
                    volume: summary.volume,
                    ratios: summary.ratios,
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn get(&self, date: NaiveDate, channel: Channel) -> Option<&ChannelColumns> {
        self.rows.get(&date)?[channel.index()].as_ref()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Whether any date carries data for the channel.
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.rows.values().any(|row| row[channel.index()].is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(day: u32, channel: Channel, spend: f64) -> DailyChannelSummary {
        DailyChannelSummary {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            channel,
            volume: MediaVolume {
                spend,
                ..MediaVolume::default()
            },
            ratios: EfficiencyRatios::default(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_union_of_channel_dates() {
        let pivot = MarketingPivot::build(&[
            summary(1, Channel::Facebook, 10.0),
            summary(2, Channel::Google, 20.0),
            summary(2, Channel::Facebook, 30.0),
        ])
        .unwrap();

        assert_eq!(pivot.dates().collect::<Vec<_>>(), vec![date(1), date(2)]);
        assert_eq!(pivot.get(date(1), Channel::Facebook).unwrap().volume.spend, 10.0);
        assert!(pivot.get(date(1), Channel::Google).is_none());
        assert_eq!(pivot.get(date(2), Channel::Google).unwrap().volume.spend, 20.0);
        assert!(pivot.has_channel(Channel::Google));
        assert!(!pivot.has_channel(Channel::TikTok));
    }

    #[test]
    fn test_duplicate_date_channel_is_rejected() {
        let err = MarketingPivot::build(&[
            summary(3, Channel::TikTok, 1.0),
            summary(3, Channel::TikTok, 2.0),
        ])
        .unwrap_err();
        assert_eq!(err.table, "daily_marketing");
        assert!(err.key.contains("2024-01-03"));
        assert!(err.key.contains("TikTok"));
    }
}
