//! Outer join of daily business outcomes with the wide marketing pivot,
//! followed by cross-channel totals and CAC.

use adspend_core::types::{AnnotatedBusinessRecord, ChannelPerformance, CombinedRecord};
use adspend_core::{Channel, DuplicateKeyError};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::efficiency::safe_div;
use crate::pivot::MarketingPivot;

/// Join business records and the pivot on date.
///
/// The result holds exactly one record per date present in either input,
/// ascending by date. Anything missing on one side is zero-filled, including
/// channel groups for channels with no activity in the run.
pub fn combine(
    business: &[AnnotatedBusinessRecord],
    pivot: &MarketingPivot,
) -> Result<Vec<CombinedRecord>, DuplicateKeyError> {
    let mut by_date: BTreeMap<NaiveDate, &AnnotatedBusinessRecord> = BTreeMap::new();
    for record in business {
        if by_date.insert(record.record.date, record).is_some() {
            return Err(DuplicateKeyError::new("business", record.record.date));
        }
    }

    let mut dates: Vec<NaiveDate> = by_date.keys().copied().chain(pivot.dates()).collect();
    dates.sort_unstable();
    dates.dedup();

    Ok(dates
        .into_iter()
        .map(|date| combine_day(date, by_date.get(&date).copied(), pivot))
        .collect())
}

fn combine_day(
    date: NaiveDate,
    business: Option<&AnnotatedBusinessRecord>,
    pivot: &MarketingPivot,
) -> CombinedRecord {
    let (total_revenue, gross_profit, order_count, new_customers, gross_margin, aov) =
        match business {
            Some(b) => (
                b.record.total_revenue,
                b.record.gross_profit,
                b.record.order_count,
                b.record.new_customers,
                b.gross_margin,
                b.aov,
            ),
            None => (0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        };

    let mut channels = [ChannelPerformance::default(); Channel::COUNT];
    for channel in Channel::ALL {
        let perf = &mut channels[channel.index()];
        if let Some(columns) = pivot.get(date, channel) {
            perf.volume = columns.volume;
            perf.ratios = columns.ratios;
        }
        // New customers are not attributed per channel; every channel shares
        // the day's business count.
        perf.cac = safe_div(perf.volume.spend, new_customers);
    }

    let total_spend: f64 = channels.iter().map(|c| c.volume.spend).sum();
    let total_attributed_revenue: f64 = channels.iter().map(|c| c.volume.attributed_revenue).sum();

    CombinedRecord {
        date,
        total_revenue,
        gross_profit,
        order_count,
        new_customers,
        gross_margin,
        aov,
        channels,
        total_spend,
        total_attributed_revenue,
        total_roas: safe_div(total_attributed_revenue, total_spend),
        total_cac: safe_div(total_spend, new_customers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspend_core::types::{BusinessRecord, DailyChannelSummary, EfficiencyRatios, MediaVolume};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn business(day: u32, revenue: f64, new_customers: f64) -> AnnotatedBusinessRecord {
        AnnotatedBusinessRecord {
            record: BusinessRecord {
                date: date(day),
                total_revenue: revenue,
                gross_profit: revenue / 2.0,
                order_count: 4.0,
                new_customers,
            },
            gross_margin: 0.5,
            aov: revenue / 4.0,
        }
    }

    fn summary(day: u32, channel: Channel, spend: f64, revenue: f64) -> DailyChannelSummary {
        DailyChannelSummary {
            date: date(day),
            channel,
            volume: MediaVolume {
                impressions: 100.0,
                clicks: 10.0,
                spend,
                attributed_revenue: revenue,
            },
            ratios: EfficiencyRatios {
                roas: safe_div(revenue, spend),
                ..EfficiencyRatios::default()
            },
        }
    }

    #[test]
    fn test_outer_join_covers_union_of_dates() {
        let pivot = MarketingPivot::build(&[
            summary(2, Channel::Facebook, 50.0, 100.0),
            summary(3, Channel::Google, 20.0, 10.0),
        ])
        .unwrap();
        let combined = combine(&[business(1, 400.0, 2.0), business(2, 800.0, 5.0)], &pivot).unwrap();

        let dates: Vec<NaiveDate> = combined.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);

        // Business-only date: every channel zero.
        let day1 = &combined[0];
        assert_eq!(day1.total_spend, 0.0);
        assert_eq!(day1.total_roas, 0.0);
        assert_eq!(day1.total_cac, 0.0);
        for channel in Channel::ALL {
            assert_eq!(*day1.channel(channel), ChannelPerformance::default());
        }

        // Marketing-only date: business fields zero, CAC zero.
        let day3 = &combined[2];
        assert_eq!(day3.total_revenue, 0.0);
        assert_eq!(day3.new_customers, 0.0);
        assert_eq!(day3.channel(Channel::Google).volume.spend, 20.0);
        assert_eq!(day3.channel(Channel::Google).cac, 0.0);
        assert!((day3.total_roas - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_totals_and_cac() {
        let pivot = MarketingPivot::build(&[
            summary(1, Channel::Facebook, 60.0, 120.0),
            summary(1, Channel::Google, 30.0, 30.0),
            summary(1, Channel::TikTok, 10.0, 50.0),
        ])
        .unwrap();
        let combined = combine(&[business(1, 1000.0, 4.0)], &pivot).unwrap();
        let day = &combined[0];

        assert!((day.total_spend - 100.0).abs() < 1e-9);
        assert!((day.total_attributed_revenue - 200.0).abs() < 1e-9);
        assert!((day.total_roas - 2.0).abs() < 1e-9);
        assert!((day.total_cac - 25.0).abs() < 1e-9);
        assert!((day.channel(Channel::Facebook).cac - 15.0).abs() < 1e-9);
        assert!((day.channel(Channel::Google).cac - 7.5).abs() < 1e-9);
        assert!((day.channel(Channel::TikTok).cac - 2.5).abs() < 1e-9);
        let per_channel: f64 = Channel::ALL.iter().map(|c| day.channel(*c).volume.spend).sum();
        assert_eq!(per_channel, day.total_spend);
    }

    #[test]
    fn test_duplicate_business_date_is_rejected() {
        let err = combine(
            &[business(1, 10.0, 1.0), business(1, 20.0, 1.0)],
            &MarketingPivot::default(),
        )
        .unwrap_err();
        assert_eq!(err, DuplicateKeyError::new("business", date(1)));
    }

    #[test]
    fn test_empty_inputs() {
        let combined = combine(&[], &MarketingPivot::default()).unwrap();
        assert!(combined.is_empty());
    }
}
