//! Status classification for individual metric values.

use serde::Serialize;

use crate::domain::{MetricKey, MetricSet, check_metric_value};
use crate::error::Result;
use crate::registry::{MetricRegistry, MetricSpec};

/// Status tier of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Within the good bound.
    Good,
    /// Past the good bound but within the acceptable bound.
    Acceptable,
    /// Past the acceptable bound.
    Problematic,
    /// The metric has no tiers.
    NotEvaluated,
}

impl Tier {
    /// Display label for the tier.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Good => "Good",
            Tier::Acceptable => "Acceptable",
            Tier::Problematic => "Problematic",
            Tier::NotEvaluated => "Not evaluated",
        }
    }
}

/// Result of classifying one metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Metric that was classified.
    pub metric: MetricKey,
    /// The classified value.
    pub value: f64,
    /// Resulting tier.
    pub tier: Tier,
    /// Display label for the tier.
    pub label: &'static str,
}

/// Classify a single value. Boundary values fall into the better tier.
pub fn classify(registry: &MetricRegistry, key: MetricKey, value: f64) -> Result<Classification> {
    check_metric_value(key, value)?;
    let tier = tier_for(registry.spec(key), value);
    Ok(Classification {
        metric: key,
        value,
        tier,
        label: tier.label(),
    })
}

/// Classify a value for a metric given by name.
pub fn classify_str(registry: &MetricRegistry, key: &str, value: f64) -> Result<Classification> {
    let spec = registry.spec_for(key)?;
    classify(registry, spec.key, value)
}

/// Classify every metric of a set, in canonical key order.
pub fn classify_set(registry: &MetricRegistry, metrics: &MetricSet) -> Result<Vec<Classification>> {
    metrics
        .values()
        .map(|(key, value)| classify(registry, key, value))
        .collect()
}

/// Tier for an already validated value.
pub fn tier_for(spec: &MetricSpec, value: f64) -> Tier {
    let Some(bounds) = spec.tiers else {
        return Tier::NotEvaluated;
    };
    if spec.direction.within(value, bounds.good) {
        Tier::Good
    } else if spec.direction.within(value, bounds.acceptable) {
        Tier::Acceptable
    } else {
        Tier::Problematic
    }
}
