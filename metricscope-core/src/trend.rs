//! Historical trend aggregation.
//!
//! Folds an ordered history of snapshots into one time series per metric,
//! with a direction derived from the first and last values and summary
//! statistics for charting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{MetricKey, Snapshot};
use crate::error::{MetricScopeError, Result};
use crate::registry::{Direction, MetricRegistry};

/// Default tolerance below which a change counts as flat.
pub const DEFAULT_FLAT_EPSILON: f64 = 1e-6;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tuning for trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendOptions {
    /// Absolute change at or below which the direction is `Flat`.
    pub epsilon: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_FLAT_EPSILON,
        }
    }
}

impl TrendOptions {
    /// Reject a non-finite or negative epsilon.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(MetricScopeError::invalid(
                "trend epsilon",
                format!("{} must be finite and non-negative", self.epsilon),
            ));
        }
        Ok(())
    }
}

/// Overall movement of a metric across a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Moved in the favourable direction.
    Improving,
    /// Moved in the unfavourable direction.
    Worsening,
    /// Unchanged within epsilon.
    Flat,
}

/// One point of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Snapshot time.
    pub taken_at: DateTime<Utc>,
    /// Metric value at that time.
    pub value: f64,
}

/// Summary statistics of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// First value.
    pub first: f64,
    /// Last value.
    pub last: f64,
    /// `last - first`.
    pub change: f64,
}

/// Series and derived statistics for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrend {
    /// Metric the series belongs to.
    pub metric: MetricKey,
    /// Points in history order.
    pub points: Vec<TrendPoint>,
    /// Direction from first to last value.
    pub direction: TrendDirection,
    /// Least-squares slope in value units per day; zero without a time span.
    pub slope_per_day: f64,
    /// Summary statistics.
    pub summary: TrendSummary,
}

/// Trend for every metric, in canonical key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrendSeries {
    trends: Vec<MetricTrend>,
}

impl TrendSeries {
    /// Trend of a single metric.
    pub fn get(&self, key: MetricKey) -> &MetricTrend {
        &self.trends[key as usize]
    }

    /// All trends.
    pub fn iter(&self) -> impl Iterator<Item = &MetricTrend> {
        self.trends.iter()
    }

    /// Number of snapshots the series were built from.
    pub fn len(&self) -> usize {
        self.trends.first().map_or(0, |trend| trend.points.len())
    }

    /// Always false; aggregation rejects empty histories.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate a history into per-metric trends.
///
/// `history` must already be sorted by `taken_at` ascending. The aggregator
/// does not sort it; an out-of-order history yields an undefined direction.
pub fn aggregate(
    registry: &MetricRegistry,
    history: &[Snapshot],
    options: &TrendOptions,
) -> Result<TrendSeries> {
    options.validate()?;
    if history.is_empty() {
        return Err(MetricScopeError::EmptyHistory);
    }
    for snapshot in history {
        snapshot.metrics.validate()?;
    }
    if history
        .windows(2)
        .any(|pair| pair[1].taken_at < pair[0].taken_at)
    {
        log::warn!(
            "history of {} snapshots is not sorted by time; trend directions are undefined",
            history.len()
        );
    }

    let origin = history[0].taken_at;
    let trends = MetricKey::ALL
        .into_iter()
        .map(|metric| {
            let points: Vec<TrendPoint> = history
                .iter()
                .map(|snapshot| TrendPoint {
                    taken_at: snapshot.taken_at,
                    value: snapshot.metrics.get(metric),
                })
                .collect();
            let summary = summarize(&points);
            let direction = direction_between(
                registry.spec(metric).direction,
                summary.first,
                summary.last,
                options.epsilon,
            );
            MetricTrend {
                metric,
                slope_per_day: slope_per_day(origin, &points),
                direction,
                summary,
                points,
            }
        })
        .collect();

    Ok(TrendSeries { trends })
}

/// Direction implied by moving from `first` to `last`.
pub fn direction_between(
    direction: Direction,
    first: f64,
    last: f64,
    epsilon: f64,
) -> TrendDirection {
    let change = last - first;
    if change.abs() <= epsilon {
        TrendDirection::Flat
    } else if direction.is_improvement(change) {
        TrendDirection::Improving
    } else {
        TrendDirection::Worsening
    }
}

fn summarize(points: &[TrendPoint]) -> TrendSummary {
    let first = points.first().map_or(0.0, |point| point.value);
    let last = points.last().map_or(0.0, |point| point.value);
    let (min, max, sum) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), point| (min.min(point.value), max.max(point.value), sum + point.value),
    );
    TrendSummary {
        min,
        max,
        mean: sum / points.len() as f64,
        first,
        last,
        change: last - first,
    }
}

fn slope_per_day(origin: DateTime<Utc>, points: &[TrendPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let xs: Vec<f64> = points
        .iter()
        .map(|point| (point.taken_at - origin).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();
    let n = points.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|point| point.value).sum::<f64>() / n;
    let (covariance, variance) = xs.iter().zip(points).fold((0.0, 0.0), |(cov, var), (x, point)| {
        let dx = x - mean_x;
        (cov + dx * (point.value - mean_y), var + dx * dx)
    });
    if variance == 0.0 {
        0.0
    } else {
        covariance / variance
    }
}
