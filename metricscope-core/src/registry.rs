//! Metric specification registry.
//!
//! The registry is the single table describing how every metric is judged:
//! which direction is favourable and where the tier boundaries lie. Logic in
//! the classifier, delta engine, and trend aggregator reads direction from
//! here and never branches on a specific metric.

use std::sync::OnceLock;

use serde::Serialize;

use crate::domain::MetricKey;
use crate::error::{MetricScopeError, Result};
use crate::settings::{ThresholdOverride, ThresholdSettings};

/// Which way a metric should move to count as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smaller values are better.
    LowerIsBetter,
    /// Larger values are better.
    HigherIsBetter,
}

impl Direction {
    /// Whether a signed change moves the metric in the favourable direction.
    pub fn is_improvement(self, change: f64) -> bool {
        match self {
            Direction::LowerIsBetter => change < 0.0,
            Direction::HigherIsBetter => change > 0.0,
        }
    }

    /// Whether a signed change moves the metric in the unfavourable direction.
    pub fn is_regression(self, change: f64) -> bool {
        match self {
            Direction::LowerIsBetter => change > 0.0,
            Direction::HigherIsBetter => change < 0.0,
        }
    }

    /// Whether `value` is at least as good as `bound`.
    pub fn within(self, value: f64, bound: f64) -> bool {
        match self {
            Direction::LowerIsBetter => value <= bound,
            Direction::HigherIsBetter => value >= bound,
        }
    }
}

/// Tier boundaries for a metric.
///
/// For lower-is-better metrics both bounds are inclusive maxima; for
/// higher-is-better metrics they are inclusive minima.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierBounds {
    /// Boundary of the `Good` tier.
    pub good: f64,
    /// Boundary of the `Acceptable` tier.
    pub acceptable: f64,
}

impl TierBounds {
    fn unbounded(direction: Direction) -> Self {
        let bound = match direction {
            Direction::LowerIsBetter => f64::MAX,
            Direction::HigherIsBetter => 0.0,
        };
        TierBounds {
            good: bound,
            acceptable: bound,
        }
    }

    fn validate(self, key: MetricKey, direction: Direction) -> Result<Self> {
        for (name, bound) in [("good", self.good), ("acceptable", self.acceptable)] {
            if !bound.is_finite() || bound < 0.0 {
                return Err(MetricScopeError::invalid(
                    format!("{key} {name} threshold"),
                    format!("{bound} must be finite and non-negative"),
                ));
            }
        }
        if !direction.within(self.good, self.acceptable) {
            return Err(MetricScopeError::invalid(
                format!("{key} thresholds"),
                format!(
                    "good bound {} is looser than acceptable bound {}",
                    self.good, self.acceptable
                ),
            ));
        }
        Ok(self)
    }

    fn apply(self, direction: Direction, value: ThresholdOverride) -> Self {
        match value {
            ThresholdOverride::Acceptable(acceptable) => {
                let good = match direction {
                    Direction::LowerIsBetter => self.good.min(acceptable),
                    Direction::HigherIsBetter => self.good.max(acceptable),
                };
                TierBounds { good, acceptable }
            }
            ThresholdOverride::Tiers { good, acceptable } => TierBounds { good, acceptable },
        }
    }
}

/// Static description of a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    /// Metric key.
    pub key: MetricKey,
    /// Short label, e.g. `CC`.
    pub label: &'static str,
    /// Human description.
    pub description: &'static str,
    /// Favourable direction.
    pub direction: Direction,
    /// Tier boundaries; `None` means the metric is tracked but not evaluated.
    pub tiers: Option<TierBounds>,
}

/// Table of metric specifications, one per [`MetricKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRegistry {
    specs: Vec<MetricSpec>,
}

impl MetricRegistry {
    /// The built-in table with default thresholds.
    pub fn standard() -> &'static MetricRegistry {
        static STANDARD: OnceLock<MetricRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| MetricRegistry {
            specs: MetricKey::ALL.into_iter().map(default_spec).collect(),
        })
    }

    /// Copy of this registry with threshold overrides applied.
    ///
    /// Overriding an untiered metric gives it tiers; a bare number sets the
    /// acceptable bound and tightens the good bound to match when needed.
    pub fn with_thresholds(&self, settings: &ThresholdSettings) -> Result<MetricRegistry> {
        let mut specs = self.specs.clone();
        for (key, value) in settings.iter() {
            let spec = &mut specs[key as usize];
            let current = spec
                .tiers
                .unwrap_or_else(|| TierBounds::unbounded(spec.direction));
            let bounds = current.apply(spec.direction, value);
            spec.tiers = Some(bounds.validate(key, spec.direction)?);
        }
        Ok(MetricRegistry { specs })
    }

    /// Spec for a typed key.
    pub fn spec(&self, key: MetricKey) -> &MetricSpec {
        &self.specs[key as usize]
    }

    /// Spec for a metric name, failing with `UnknownMetric` if unrecognised.
    pub fn spec_for(&self, key: &str) -> Result<&MetricSpec> {
        let key: MetricKey = key.parse()?;
        Ok(self.spec(key))
    }

    /// All specs in canonical key order.
    pub fn specs(&self) -> impl Iterator<Item = &MetricSpec> {
        self.specs.iter()
    }

    #[cfg(test)]
    pub(crate) fn with_spec(&self, spec: MetricSpec) -> MetricRegistry {
        let mut specs = self.specs.clone();
        let idx = spec.key as usize;
        specs[idx] = spec;
        MetricRegistry { specs }
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        MetricRegistry::standard().clone()
    }
}

fn default_spec(key: MetricKey) -> MetricSpec {
    let (label, description, tiers) = match key {
        MetricKey::Noc => ("NOC", "Number of Classes", None),
        MetricKey::Rfc => ("RFC", "Response for Class", None),
        MetricKey::Lcom => (
            "LCOM",
            "Lack of Cohesion of Methods",
            Some(TierBounds {
                good: 3.0,
                acceptable: 5.0,
            }),
        ),
        MetricKey::Wmc => (
            "WMC",
            "Weighted Methods per Class",
            Some(TierBounds {
                good: 10.0,
                acceptable: 15.0,
            }),
        ),
        MetricKey::Dit => ("DIT", "Depth of Inheritance Tree", None),
        MetricKey::Cc => (
            "CC",
            "Cyclomatic Complexity",
            Some(TierBounds {
                good: 5.0,
                acceptable: 10.0,
            }),
        ),
        MetricKey::Loc => ("LOC", "Lines of Code", None),
    };
    MetricSpec {
        key,
        label,
        description,
        direction: Direction::LowerIsBetter,
        tiers,
    }
}
