//! Snapshot deltas and the merge-request gate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::{Tier, tier_for};
use crate::domain::{MetricKey, MetricSet, check_metric_value};
use crate::error::{MetricScopeError, Result};
use crate::registry::MetricRegistry;

/// Change of a single metric between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricChange {
    /// Metric the change belongs to.
    pub metric: MetricKey,
    /// Value in the base snapshot.
    pub base: f64,
    /// Value in the head snapshot.
    pub head: f64,
    /// `head - base`.
    pub change: f64,
}

/// Per-metric signed differences between a base and a head snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Delta {
    changes: Vec<MetricChange>,
}

impl Delta {
    /// Change for a single metric.
    pub fn get(&self, key: MetricKey) -> &MetricChange {
        &self.changes[key as usize]
    }

    /// Signed change for a single metric.
    pub fn change(&self, key: MetricKey) -> f64 {
        self.get(key).change
    }

    /// All changes in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricChange> {
        self.changes.iter()
    }

    /// The delta from head back to base.
    pub fn reversed(&self) -> Delta {
        Delta {
            changes: self
                .changes
                .iter()
                .map(|entry| MetricChange {
                    metric: entry.metric,
                    base: entry.head,
                    head: entry.base,
                    change: -entry.change,
                })
                .collect(),
        }
    }

    /// Whether every change is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.changes.iter().all(|entry| entry.change == 0.0)
    }
}

/// Compute `head - base` for every metric.
pub fn diff(base: &MetricSet, head: &MetricSet) -> Delta {
    let changes = MetricKey::ALL
        .into_iter()
        .map(|metric| {
            let base = base.get(metric);
            let head = head.get(metric);
            MetricChange {
                metric,
                base,
                head,
                change: head - base,
            }
        })
        .collect();
    Delta { changes }
}

/// Effect of a change on code quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaImpact {
    /// Moved in the favourable direction.
    Improvement,
    /// Did not move.
    Neutral,
    /// Moved in the unfavourable direction.
    Regression,
}

/// A change together with its impact and the head value's tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaAssessment {
    /// Metric assessed.
    pub metric: MetricKey,
    /// Signed change.
    pub change: f64,
    /// Whether the change helps or hurts.
    pub impact: DeltaImpact,
    /// Tier of the head value.
    pub head_tier: Tier,
}

/// Label each change of a delta as an improvement, neutral, or regression.
pub fn assess(registry: &MetricRegistry, delta: &Delta) -> Vec<DeltaAssessment> {
    delta
        .iter()
        .map(|entry| {
            let spec = registry.spec(entry.metric);
            let impact = if spec.direction.is_regression(entry.change) {
                DeltaImpact::Regression
            } else if spec.direction.is_improvement(entry.change) {
                DeltaImpact::Improvement
            } else {
                DeltaImpact::Neutral
            };
            DeltaAssessment {
                metric: entry.metric,
                change: entry.change,
                impact,
                head_tier: tier_for(spec, entry.head),
            }
        })
        .collect()
}

/// How regressions are judged by the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// A regression fails only when the head value lands in the
    /// `Problematic` tier of a tiered metric.
    #[default]
    TierBreach,
    /// Any regression beyond its allowance fails, tiered or not.
    AnyRegression,
}

/// Pass/fail policy applied to merge-request deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatePolicy {
    /// Unfavourable change tolerated per metric; absent metrics tolerate 0.
    pub acceptable_increase: BTreeMap<MetricKey, f64>,
    /// How regressions are judged.
    pub mode: GateMode,
}

impl GatePolicy {
    /// Set the tolerated regression for a metric.
    pub fn with_allowance(mut self, key: MetricKey, allowance: f64) -> Self {
        self.acceptable_increase.insert(key, allowance);
        self
    }

    /// Switch the judgement mode.
    pub fn with_mode(mut self, mode: GateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Tolerated regression for a metric.
    pub fn allowance(&self, key: MetricKey) -> f64 {
        self.acceptable_increase.get(&key).copied().unwrap_or(0.0)
    }

    /// Reject non-finite or negative allowances.
    pub fn validate(&self) -> Result<()> {
        for (key, allowance) in &self.acceptable_increase {
            if !allowance.is_finite() || *allowance < 0.0 {
                return Err(MetricScopeError::invalid(
                    format!("{key} acceptable increase"),
                    format!("{allowance} must be finite and non-negative"),
                ));
            }
        }
        Ok(())
    }
}

/// Gate decision for a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateOutcome {
    /// True when no metric violated the policy.
    pub passed: bool,
    /// Metrics that violated the policy, in canonical order.
    pub violations: Vec<MetricKey>,
}

/// Judge a delta against a gate policy.
///
/// Base and head values must be finite and non-negative; otherwise the delta
/// is rejected with `InvalidValue` before any metric is judged.
pub fn evaluate_gate(
    registry: &MetricRegistry,
    delta: &Delta,
    policy: &GatePolicy,
) -> Result<GateOutcome> {
    policy.validate()?;
    for entry in delta.iter() {
        check_metric_value(entry.metric, entry.base)?;
        check_metric_value(entry.metric, entry.head)?;
    }
    let mut violations = Vec::new();
    for entry in delta.iter() {
        if entry.change == 0.0 {
            continue;
        }
        let spec = registry.spec(entry.metric);
        if !spec.direction.is_regression(entry.change) {
            continue;
        }
        let allowance = policy.allowance(entry.metric);
        if entry.change.abs() <= allowance {
            continue;
        }
        let violated = match policy.mode {
            GateMode::TierBreach => tier_for(spec, entry.head) == Tier::Problematic,
            GateMode::AnyRegression => true,
        };
        log::debug!(
            "gate {}: change {:+} (allowance {}), head {} -> {}",
            entry.metric,
            entry.change,
            allowance,
            entry.head,
            if violated { "violation" } else { "tolerated" }
        );
        if violated {
            violations.push(entry.metric);
        }
    }
    Ok(GateOutcome {
        passed: violations.is_empty(),
        violations,
    })
}
