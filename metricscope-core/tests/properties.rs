//! Property tests for the classification, delta, and trend engines.

use chrono::{Duration, TimeZone, Utc};
use metricscope_core::{
    MetricKey, MetricRegistry, MetricSet, Snapshot, Tier, TrendDirection, TrendOptions,
    aggregate, classify, diff,
};
use proptest::prelude::*;

fn metric_value() -> impl Strategy<Value = f64> {
    0.0f64..1_000.0
}

fn metric_set() -> impl Strategy<Value = MetricSet> {
    (
        metric_value(),
        metric_value(),
        metric_value(),
        metric_value(),
        metric_value(),
        metric_value(),
        0u64..1_000_000,
    )
        .prop_map(|(noc, rfc, lcom, wmc, dit, cc, loc)| MetricSet {
            noc,
            rfc,
            lcom,
            wmc,
            dit,
            cc,
            loc,
        })
}

proptest! {
    #[test]
    fn classify_is_total_over_valid_input(metrics in metric_set()) {
        let registry = MetricRegistry::standard();
        for (key, value) in metrics.values() {
            let result = classify(registry, key, value);
            prop_assert!(result.is_ok());
            let tier = result.unwrap().tier;
            let tiered = registry.spec(key).tiers.is_some();
            prop_assert_eq!(tier == Tier::NotEvaluated, !tiered);
        }
    }

    #[test]
    fn diff_of_identical_sets_is_zero(metrics in metric_set()) {
        let delta = diff(&metrics, &metrics);
        for key in MetricKey::ALL {
            prop_assert_eq!(delta.change(key), 0.0);
        }
    }

    #[test]
    fn diff_is_antisymmetric(base in metric_set(), head in metric_set()) {
        let forward = diff(&base, &head);
        let backward = diff(&head, &base);
        for key in MetricKey::ALL {
            prop_assert_eq!(-forward.change(key), backward.change(key));
        }
        prop_assert_eq!(forward.reversed(), backward);
    }

    #[test]
    fn single_snapshot_history_is_flat(metrics in metric_set()) {
        let stamp = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).single().unwrap();
        let series = aggregate(
            MetricRegistry::standard(),
            &[Snapshot::new(stamp, metrics)],
            &TrendOptions::default(),
        )
        .unwrap();
        for trend in series.iter() {
            prop_assert_eq!(trend.direction, TrendDirection::Flat);
        }
    }

    #[test]
    fn decreasing_lower_is_better_series_improves(
        start in 1.0f64..100.0,
        steps in proptest::collection::vec(0.01f64..1.0, 1..12),
    ) {
        let origin = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap();
        let mut lcom = start + steps.len() as f64;
        let history: Vec<Snapshot> = std::iter::once(0.0)
            .chain(steps.iter().copied())
            .enumerate()
            .map(|(index, step)| {
                lcom -= step;
                Snapshot::new(
                    origin + Duration::days(30 * index as i64),
                    MetricSet { noc: 1.0, rfc: 1.0, lcom, wmc: 1.0, dit: 1.0, cc: 1.0, loc: 1 },
                )
            })
            .collect();
        let series = aggregate(MetricRegistry::standard(), &history, &TrendOptions::default())
            .unwrap();
        prop_assert_eq!(series.get(MetricKey::Lcom).direction, TrendDirection::Improving);
        prop_assert!(series.get(MetricKey::Lcom).slope_per_day < 0.0);
    }
}
