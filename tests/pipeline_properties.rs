//! Property tests for the aggregation pipeline.
//!
//! Uses proptest to verify:
//! 1. Partition: registered + casual equals total, per day and overall
//! 2. Key coverage: every table has exactly one row per distinct input key
//! 3. Calendar order: monthly rows are strictly increasing months
//! 4. Purity: the same inputs always produce the same output
//! 5. Empty selections produce empty tables, never errors

use bike_dashboard::data::{DateRange, Dataset, EventRecord};
use bike_dashboard::stats::{compute, compute_range, MonthYear, RenderInputs, WeatherAggregation};
use bike_dashboard::DateSelection;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const SEASONS: [&str; 4] = ["Fall", "Spring", "Summer", "Winter"];
const WEATHER: [&str; 3] = ["Clear", "Light Rain", "Mist"];

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 11, 15).unwrap()
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_record() -> impl Strategy<Value = EventRecord> {
    (
        0i64..90,
        0u8..24,
        0usize..SEASONS.len(),
        0usize..WEATHER.len(),
        any::<bool>(),
        0u64..500,
        0u64..500,
    )
        .prop_map(|(offset, hour, season, weather, working, registered, casual)| {
            EventRecord::new(
                origin() + Duration::days(offset),
                hour,
                SEASONS[season],
                WEATHER[weather],
                if working { "Yes" } else { "No" },
                registered,
                casual,
            )
        })
}

fn arb_records() -> impl Strategy<Value = Vec<EventRecord>> {
    prop::collection::vec(arb_record(), 1..60)
}

fn arb_weather_mode() -> impl Strategy<Value = WeatherAggregation> {
    prop_oneof![Just(WeatherAggregation::Sum), Just(WeatherAggregation::Mean)]
}

fn full_range(weather: WeatherAggregation) -> RenderInputs {
    RenderInputs {
        selection: DateSelection::default(),
        weather,
        parallel: false,
    }
}

/// Sorted distinct values of one field.
fn distinct<T: Ord>(records: &[EventRecord], field: impl Fn(&EventRecord) -> T) -> Vec<T> {
    records
        .iter()
        .map(field)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── 1. Partition ─────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Registered plus casual always adds up to the total.
    #[test]
    fn totals_partition(records in arb_records()) {
        let dataset = Dataset::from_records(&records).unwrap();
        let data = compute(&dataset, &full_range(WeatherAggregation::Sum)).unwrap();

        let expected: u64 = records.iter().map(|r| r.user_count).sum();
        prop_assert_eq!(data.totals.total, expected);
        prop_assert_eq!(data.totals.total, data.totals.registered + data.totals.casual);
        prop_assert_eq!(data.tables.daily_total.values().sum::<u64>(), expected);
        prop_assert_eq!(data.tables.monthly_trend.values().sum::<u64>(), expected);

        for (date, total) in data.tables.daily_total.iter() {
            let registered = data.tables.daily_registered.get(date).copied().unwrap_or(0);
            let casual = data.tables.daily_casual.get(date).copied().unwrap_or(0);
            prop_assert_eq!(*total, registered + casual);
        }

        let seasonal: u64 = data.tables.seasonal_split.values().map(|s| s.total()).sum();
        let working: u64 = data.tables.working_day_split.values().map(|s| s.total()).sum();
        prop_assert_eq!(seasonal, expected);
        prop_assert_eq!(working, expected);
    }
}

// ── 2. Key coverage ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Each table is keyed by exactly the distinct values present, ascending.
    #[test]
    fn keys_match_distinct_inputs(records in arb_records()) {
        let dataset = Dataset::from_records(&records).unwrap();
        let data = compute(&dataset, &full_range(WeatherAggregation::Sum)).unwrap();
        let tables = &data.tables;

        let dates = distinct(&records, |r| r.date_day);
        let hours = distinct(&records, |r| r.hour);
        let seasons = distinct(&records, |r| r.season.clone());
        let weather = distinct(&records, |r| r.weather_situation.clone());
        let working = distinct(&records, |r| r.working_day.clone());
        let months = distinct(&records, |r| MonthYear::of(r.date_day));

        prop_assert_eq!(tables.daily_total.keys().copied().collect::<Vec<_>>(), dates.clone());
        prop_assert_eq!(tables.daily_registered.keys().copied().collect::<Vec<_>>(), dates.clone());
        prop_assert_eq!(tables.daily_casual.keys().copied().collect::<Vec<_>>(), dates);
        prop_assert_eq!(tables.hourly_total.keys().copied().collect::<Vec<_>>(), hours);
        prop_assert_eq!(tables.seasonal_split.keys().cloned().collect::<Vec<_>>(), seasons);
        prop_assert_eq!(tables.weather.keys().cloned().collect::<Vec<_>>(), weather);
        prop_assert_eq!(tables.working_day_split.keys().cloned().collect::<Vec<_>>(), working);
        prop_assert_eq!(tables.monthly_trend.keys().copied().collect::<Vec<_>>(), months);
    }

    /// Weather values are the per-situation sum or mean of `user_count`.
    #[test]
    fn weather_matches_mode(records in arb_records(), mode in arb_weather_mode()) {
        let dataset = Dataset::from_records(&records).unwrap();
        let data = compute(&dataset, &full_range(mode)).unwrap();

        let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for r in &records {
            let entry = groups.entry(r.weather_situation.as_str()).or_default();
            entry.0 += r.user_count;
            entry.1 += 1;
        }

        for (situation, value) in data.tables.weather.iter() {
            let (sum, n) = groups[situation.as_str()];
            let expected = match mode {
                WeatherAggregation::Sum => sum as f64,
                WeatherAggregation::Mean => sum as f64 / n as f64,
            };
            prop_assert!((value - expected).abs() < 1e-6, "{situation}: {value} != {expected}");
        }
    }
}

// ── 3. Calendar order ────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Months are strictly increasing even across a year boundary.
    #[test]
    fn monthly_rows_strictly_increase(records in arb_records()) {
        let dataset = Dataset::from_records(&records).unwrap();
        let data = compute(&dataset, &full_range(WeatherAggregation::Sum)).unwrap();

        let months: Vec<MonthYear> = data.tables.monthly_trend.keys().copied().collect();
        prop_assert!(months.windows(2).all(|w| w[0] < w[1]));
        for pair in months.windows(2) {
            prop_assert!(pair[0].first_day() < pair[1].first_day());
        }
    }
}

// ── 4. Purity ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Recomputing, or computing in parallel, yields identical output.
    #[test]
    fn compute_is_idempotent(records in arb_records(), mode in arb_weather_mode(), a in 0i64..90, b in 0i64..90) {
        let dataset = Dataset::from_records(&records).unwrap();
        let inputs = RenderInputs {
            selection: DateSelection::new(
                origin() + Duration::days(a.min(b)),
                origin() + Duration::days(a.max(b)),
            ),
            weather: mode,
            parallel: false,
        };

        let first = compute(&dataset, &inputs);
        let second = compute(&dataset, &inputs);
        let parallel = compute(&dataset, &RenderInputs { parallel: true, ..inputs });

        match (first, second, parallel) {
            (Ok(x), Ok(y), Ok(z)) => {
                prop_assert_eq!(&x, &y);
                prop_assert_eq!(&x, &z);
            }
            (Err(x), Err(y), Err(z)) => {
                prop_assert_eq!(x.to_string(), y.to_string());
                prop_assert_eq!(x.to_string(), z.to_string());
            }
            _ => prop_assert!(false, "runs disagreed on success"),
        }
    }
}

// ── 5. Empty selections ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A day outside the dataset yields empty tables and zero totals.
    #[test]
    fn outside_day_is_empty(records in arb_records(), before in any::<bool>(), gap in 1i64..400) {
        let dataset = Dataset::from_records(&records).unwrap();
        let bounds = dataset.bounds();
        let date = if before {
            bounds.min - Duration::days(gap)
        } else {
            bounds.max + Duration::days(gap)
        };

        let data = compute_range(&dataset, DateRange::day(date), WeatherAggregation::Sum, false).unwrap();
        prop_assert_eq!(data.row_count, 0);
        prop_assert_eq!(data.totals.total, 0);
        prop_assert_eq!(data.totals.registered, 0);
        prop_assert_eq!(data.totals.casual, 0);
        prop_assert!(data.tables.is_empty());
    }

    /// Filtering to a single day keeps exactly that day's records.
    #[test]
    fn single_day_selection(records in arb_records(), pick in any::<prop::sample::Index>()) {
        let dataset = Dataset::from_records(&records).unwrap();
        let date = records[pick.index(records.len())].date_day;

        let data = compute_range(&dataset, DateRange::day(date), WeatherAggregation::Sum, false).unwrap();
        let expected: Vec<&EventRecord> = records.iter().filter(|r| r.date_day == date).collect();

        prop_assert_eq!(data.row_count, expected.len());
        prop_assert_eq!(data.tables.daily_total.len(), 1);
        prop_assert_eq!(data.totals.total, expected.iter().map(|r| r.user_count).sum::<u64>());
    }
}
