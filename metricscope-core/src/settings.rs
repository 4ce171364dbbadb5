//! Externally supplied configuration: thresholds, gate policy, trend tuning.
//!
//! Settings are read from JSON. Every section is optional and falls back to
//! the built-in defaults; whatever is present is validated before use.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::delta::{GateMode, GatePolicy};
use crate::domain::MetricKey;
use crate::error::{MetricScopeError, Result};
use crate::fs::FileSystem;
use crate::registry::MetricRegistry;
use crate::trend::TrendOptions;

/// A threshold override for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdOverride {
    /// Only the acceptable bound, as edited on the settings page.
    Acceptable(f64),
    /// Both tier bounds.
    Tiers {
        /// Bound of the `Good` tier.
        good: f64,
        /// Bound of the `Acceptable` tier.
        acceptable: f64,
    },
}

/// Threshold overrides keyed by metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdSettings {
    overrides: BTreeMap<MetricKey, ThresholdOverride>,
}

impl ThresholdSettings {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the override for a metric.
    pub fn with(mut self, key: MetricKey, value: ThresholdOverride) -> Self {
        self.overrides.insert(key, value);
        self
    }

    /// Override for a metric, if any.
    pub fn get(&self, key: MetricKey) -> Option<ThresholdOverride> {
        self.overrides.get(&key).copied()
    }

    /// All overrides in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, ThresholdOverride)> + '_ {
        self.overrides.iter().map(|(key, value)| (*key, *value))
    }

    /// Whether no metric is overridden.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Complete settings consumed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    /// Threshold overrides.
    pub thresholds: ThresholdSettings,
    /// Merge-request gate policy.
    pub gate: GatePolicy,
    /// Trend aggregation options.
    pub trend: TrendOptions,
}

impl Settings {
    /// Registry with these settings' thresholds applied.
    pub fn registry(&self) -> Result<MetricRegistry> {
        MetricRegistry::standard().with_thresholds(&self.thresholds)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.registry()?;
        self.gate.validate()?;
        self.trend.validate()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    thresholds: BTreeMap<String, ThresholdOverride>,
    gate: GateFile,
    trend: TrendFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct GateFile {
    acceptable_increase: BTreeMap<String, f64>,
    mode: GateMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TrendFile {
    epsilon: Option<f64>,
}

/// Parse and validate settings JSON.
///
/// Metric names are resolved through the registry's key parser, so an
/// unrecognised name fails with `UnknownMetric`.
pub fn parse_settings(raw: &str) -> Result<Settings> {
    let file: SettingsFile = serde_json::from_str(raw)
        .map_err(|err| MetricScopeError::invalid("settings", err.to_string()))?;

    let mut thresholds = ThresholdSettings::new();
    for (name, value) in file.thresholds {
        thresholds = thresholds.with(name.parse()?, value);
    }

    let mut gate = GatePolicy::default().with_mode(file.gate.mode);
    for (name, allowance) in file.gate.acceptable_increase {
        gate = gate.with_allowance(name.parse()?, allowance);
    }

    let mut trend = TrendOptions::default();
    if let Some(epsilon) = file.trend.epsilon {
        trend.epsilon = epsilon;
    }

    let settings = Settings {
        thresholds,
        gate,
        trend,
    };
    settings.validate()?;
    Ok(settings)
}

/// Read and validate a settings file.
pub fn load_settings<F: FileSystem>(fs: &F, path: &Path) -> Result<Settings> {
    let raw = fs.read_to_string(path)?;
    parse_settings(&raw)
}
