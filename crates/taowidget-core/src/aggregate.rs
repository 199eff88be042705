//! Merging of independently sampled balance and stake series.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::sampling::truncate_to_day;
use crate::types::{DailyData, HistoricalData};

#[derive(Debug, Default, Clone, Copy)]
struct DayTotals {
    balance: f64,
    stake: f64,
}

/// Merge balance and stake samples into one series with a single entry per
/// calendar day, sorted by date ascending.
///
/// A day that only appears in one of the inputs gets 0.0 for the other
/// metric. When a day collects several samples of the same metric, the last
/// one wins.
pub fn merge_daily(balance: &[HistoricalData], stake: &[HistoricalData]) -> Vec<DailyData> {
    let mut days: BTreeMap<DateTime<Utc>, DayTotals> = BTreeMap::new();

    for sample in balance {
        days.entry(truncate_to_day(sample.timestamp))
            .or_default()
            .balance = sample.value;
    }
    for sample in stake {
        days.entry(truncate_to_day(sample.timestamp))
            .or_default()
            .stake = sample.value;
    }

    days.into_iter()
        .map(|(date, totals)| DailyData {
            date,
            balance: totals.balance,
            stake: totals.stake,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone};
    use proptest::prelude::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 17, 5).unwrap()
    }

    fn midnight(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_merge_aligns_days() {
        let balance = vec![
            HistoricalData::new(1_014_400, at(12, 9), 3.0),
            HistoricalData::new(1_007_200, at(11, 9), 2.0),
            HistoricalData::new(1_000_000, at(10, 9), 1.0),
        ];
        let stake = vec![
            HistoricalData::new(1_014_400, at(12, 9), 30.0),
            HistoricalData::new(1_007_200, at(11, 9), 20.0),
            HistoricalData::new(1_000_000, at(10, 9), 10.0),
        ];

        let merged = merge_daily(&balance, &stake);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].date, midnight(10));
        assert_eq!(merged[2].date, midnight(12));
        assert_relative_eq!(merged[0].balance, 1.0);
        assert_relative_eq!(merged[0].stake, 10.0);
        assert_relative_eq!(merged[2].total(), 33.0);
    }

    #[test]
    fn test_merge_missing_stake_defaults_to_zero() {
        let balance = vec![
            HistoricalData::new(2, at(11, 1), 5.0),
            HistoricalData::new(1, at(10, 1), 4.0),
        ];
        let stake = vec![HistoricalData::new(2, at(11, 1), 7.0)];

        let merged = merge_daily(&balance, &stake);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, midnight(10));
        assert_relative_eq!(merged[0].balance, 4.0);
        assert_eq!(merged[0].stake, 0.0);
        assert_relative_eq!(merged[1].stake, 7.0);
    }

    #[test]
    fn test_merge_missing_balance_defaults_to_zero() {
        let stake = vec![HistoricalData::new(1, at(10, 1), 7.0)];
        let merged = merge_daily(&[], &stake);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].balance, 0.0);
        assert_relative_eq!(merged[0].stake, 7.0);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_daily(&[], &[]).is_empty());
    }

    #[test]
    fn test_merge_same_day_last_write_wins() {
        let balance = vec![
            HistoricalData::new(3, at(10, 1), 1.0),
            HistoricalData::new(2, at(10, 8), 2.0),
        ];
        let merged = merge_daily(&balance, &[]);
        assert_eq!(merged.len(), 1);
        assert_relative_eq!(merged[0].balance, 2.0);
    }

    #[test]
    fn test_merge_sorts_ascending_regardless_of_input_order() {
        let balance = vec![
            HistoricalData::new(1, at(10, 1), 1.0),
            HistoricalData::new(3, at(12, 1), 3.0),
            HistoricalData::new(2, at(11, 1), 2.0),
        ];
        let merged = merge_daily(&balance, &[]);
        let dates: Vec<_> = merged.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![midnight(10), midnight(11), midnight(12)]);
    }

    proptest! {
        #[test]
        fn prop_merge_with_itself_is_stable(values in proptest::collection::vec(0.0f64..1e6, 0..40)) {
            let base = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
            let series: Vec<HistoricalData> = values
                .iter()
                .enumerate()
                .map(|(i, v)| HistoricalData::new(i as u32, base - TimeDelta::days(i as i64), *v))
                .collect();

            let once = merge_daily(&series, &series);
            let doubled: Vec<HistoricalData> = series.iter().chain(series.iter()).cloned().collect();
            let twice = merge_daily(&doubled, &doubled);

            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_merge_one_entry_per_day(offsets in proptest::collection::vec(0i64..20, 0..60)) {
            let base = Utc.with_ymd_and_hms(2025, 1, 31, 6, 0, 0).unwrap();
            let series: Vec<HistoricalData> = offsets
                .iter()
                .map(|d| HistoricalData::new(0, base - TimeDelta::days(*d), 1.0))
                .collect();

            let merged = merge_daily(&series, &[]);
            for pair in merged.windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }
        }
    }
}
