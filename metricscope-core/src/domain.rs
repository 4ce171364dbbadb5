//! Domain entities for MetricScope.
//!
//! These are the shapes exchanged with the metrics backend. They are plain
//! values: once decoded and validated they are never mutated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::{MetricScopeError, Result};

/// One of the seven recognised software metrics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MetricKey {
    /// Number of classes.
    Noc,
    /// Response for class.
    Rfc,
    /// Lack of cohesion of methods.
    Lcom,
    /// Weighted methods per class.
    Wmc,
    /// Depth of inheritance tree.
    Dit,
    /// Cyclomatic complexity.
    Cc,
    /// Lines of code.
    Loc,
}

impl MetricKey {
    /// Every metric key, in canonical display order.
    pub const ALL: [MetricKey; 7] = [
        MetricKey::Noc,
        MetricKey::Rfc,
        MetricKey::Lcom,
        MetricKey::Wmc,
        MetricKey::Dit,
        MetricKey::Cc,
        MetricKey::Loc,
    ];

    /// Wire name of the metric.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Noc => "noc",
            MetricKey::Rfc => "rfc",
            MetricKey::Lcom => "lcom",
            MetricKey::Wmc => "wmc",
            MetricKey::Dit => "dit",
            MetricKey::Cc => "cc",
            MetricKey::Loc => "loc",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = MetricScopeError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        MetricKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| MetricScopeError::UnknownMetric(value.to_string()))
    }
}

/// Raw metric values for a project, merge request, or commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricSet {
    /// Number of classes.
    pub noc: f64,
    /// Response for class.
    pub rfc: f64,
    /// Lack of cohesion of methods.
    pub lcom: f64,
    /// Weighted methods per class.
    pub wmc: f64,
    /// Depth of inheritance tree.
    pub dit: f64,
    /// Cyclomatic complexity.
    pub cc: f64,
    /// Lines of code.
    pub loc: u64,
}

impl MetricSet {
    /// Value of a single metric.
    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Noc => self.noc,
            MetricKey::Rfc => self.rfc,
            MetricKey::Lcom => self.lcom,
            MetricKey::Wmc => self.wmc,
            MetricKey::Dit => self.dit,
            MetricKey::Cc => self.cc,
            MetricKey::Loc => self.loc as f64,
        }
    }

    /// All metric values in canonical key order.
    pub fn values(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    /// Reject NaN, infinite, and negative values.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.values() {
            check_metric_value(key, value)?;
        }
        Ok(())
    }
}

pub(crate) fn check_metric_value(key: MetricKey, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(MetricScopeError::invalid(key.as_str(), "value is NaN"));
    }
    if !value.is_finite() {
        return Err(MetricScopeError::invalid(key.as_str(), "value is not finite"));
    }
    if value < 0.0 {
        return Err(MetricScopeError::invalid(
            key.as_str(),
            format!("value {value} is negative"),
        ));
    }
    Ok(())
}

/// Where a snapshot was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Default branch of a project.
    Project {
        /// Project identifier on the backend, as used in its URL paths.
        id: String,
    },
    /// Head of a merge request.
    MergeRequest {
        /// Merge request identifier.
        id: u64,
    },
    /// A single commit.
    Commit {
        /// Commit SHA.
        sha: String,
    },
}

/// A metric set captured at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Capture time. Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
    #[serde(alias = "date", deserialize_with = "deserialize_timestamp")]
    pub taken_at: DateTime<Utc>,
    /// Optional origin of the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SnapshotSource>,
    /// Metric values.
    pub metrics: MetricSet,
}

impl Snapshot {
    /// Create a snapshot without a source tag.
    pub fn new(taken_at: DateTime<Utc>, metrics: MetricSet) -> Self {
        Self {
            taken_at,
            source: None,
            metrics,
        }
    }

    /// Attach a source tag.
    pub fn with_source(mut self, source: SnapshotSource) -> Self {
        self.source = Some(source);
        self
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp `{raw}`"))
}

/// Severity of a code issue. Ordered so that `Critical` is the greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note.
    Info,
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

impl Severity {
    /// Severities from worst to mildest.
    pub const WORST_FIRST: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Wire name of the severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A code issue reported by static analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    /// Backend identifier.
    pub id: String,
    /// How severe the issue is.
    pub severity: Severity,
    /// Human-readable summary.
    pub message: String,
    /// Rule that produced the issue.
    pub rule: String,
    /// File the issue was found in.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// Optional 1-based column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// Category of an AI refactoring suggestion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    /// Extract a block into a new method.
    ExtractMethod,
    /// Extract responsibilities into a new class.
    ExtractClass,
    /// Rename an identifier.
    Rename,
    /// Simplify an expression or control flow.
    Simplify,
    /// Anything else.
    Other,
}

impl SuggestionKind {
    /// Title-cased name, e.g. `Extract Method`.
    pub fn display_name(self) -> &'static str {
        match self {
            SuggestionKind::ExtractMethod => "Extract Method",
            SuggestionKind::ExtractClass => "Extract Class",
            SuggestionKind::Rename => "Rename",
            SuggestionKind::Simplify => "Simplify",
            SuggestionKind::Other => "Other",
        }
    }
}

/// An AI-generated refactoring suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Backend identifier.
    pub id: String,
    /// Suggestion category.
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// What the suggestion proposes.
    pub description: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Code excerpt the suggestion applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    /// Proposed replacement code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// File the suggestion targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line the suggestion targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Suggestion {
    /// Reject confidences outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(MetricScopeError::invalid(
                format!("suggestion {} confidence", self.id),
                format!("{} is outside [0, 1]", self.confidence),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> MetricSet {
        MetricSet {
            noc: 42.0,
            rfc: 24.0,
            lcom: 4.2,
            wmc: 12.5,
            dit: 3.0,
            cc: 7.8,
            loc: 12500,
        }
    }

    #[test]
    fn metric_key_parses_case_insensitively() {
        assert_eq!("LCOM".parse::<MetricKey>().expect("lcom"), MetricKey::Lcom);
        assert_eq!(" cc ".parse::<MetricKey>().expect("cc"), MetricKey::Cc);
    }

    #[test]
    fn unknown_metric_key_is_rejected() {
        let error = "coverage".parse::<MetricKey>().expect_err("unknown");
        assert!(matches!(error, MetricScopeError::UnknownMetric(key) if key == "coverage"));
    }

    #[test]
    fn metric_set_exposes_every_key() {
        let metrics = sample_metrics();
        let values: Vec<_> = metrics.values().collect();
        assert_eq!(values.len(), 7);
        assert_eq!(values[2], (MetricKey::Lcom, 4.2));
        assert_eq!(metrics.get(MetricKey::Loc), 12500.0);
    }

    #[test]
    fn validate_rejects_nan_and_negative() {
        let mut metrics = sample_metrics();
        metrics.cc = f64::NAN;
        assert!(matches!(
            metrics.validate(),
            Err(MetricScopeError::InvalidValue { field, .. }) if field == "cc"
        ));

        let mut metrics = sample_metrics();
        metrics.rfc = -1.0;
        assert!(metrics.validate().is_err());

        let mut metrics = sample_metrics();
        metrics.wmc = f64::INFINITY;
        assert!(metrics.validate().is_err());

        assert!(sample_metrics().validate().is_ok());
    }

    #[test]
    fn snapshot_accepts_plain_dates_and_rfc3339() {
        let json = r#"{"date":"2025-01-15","metrics":{"noc":1,"rfc":1,"lcom":1,"wmc":1,"dit":1,"cc":1,"loc":10}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).expect("date snapshot");
        assert_eq!(snapshot.taken_at.to_rfc3339(), "2025-01-15T00:00:00+00:00");

        let json = r#"{"takenAt":"2025-06-10T14:30:00Z","source":{"kind":"merge_request","id":123},"metrics":{"noc":1,"rfc":1,"lcom":1,"wmc":1,"dit":1,"cc":1,"loc":10}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).expect("rfc3339 snapshot");
        assert_eq!(
            snapshot.source,
            Some(SnapshotSource::MergeRequest { id: 123 })
        );
    }

    #[test]
    fn project_source_uses_backend_path_id() {
        let json = r#"{"takenAt":"2025-06-10T14:30:00Z","source":{"kind":"project","id":"grades"},"metrics":{"noc":1,"rfc":1,"lcom":1,"wmc":1,"dit":1,"cc":1,"loc":10}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).expect("project snapshot");
        assert_eq!(
            snapshot.source,
            Some(SnapshotSource::Project {
                id: "grades".to_string()
            })
        );
    }

    #[test]
    fn snapshot_rejects_garbage_timestamp() {
        let json = r#"{"takenAt":"last tuesday","metrics":{"noc":1,"rfc":1,"lcom":1,"wmc":1,"dit":1,"cc":1,"loc":10}}"#;
        let error = serde_json::from_str::<Snapshot>(json).expect_err("bad timestamp");
        assert!(error.to_string().contains("last tuesday"));
    }

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low > Severity::Info);
        assert_eq!(Severity::WORST_FIRST[0], Severity::Critical);
    }

    #[test]
    fn suggestion_uses_wire_names() {
        let json = r#"{"id":"s1","type":"extract-method","description":"Split it","codeSnippet":"fn a() {}","suggestedFix":"fn b() {}","confidence":0.85,"line":45,"file":"src/a.rs"}"#;
        let suggestion: Suggestion = serde_json::from_str(json).expect("suggestion");
        assert_eq!(suggestion.kind, SuggestionKind::ExtractMethod);
        assert_eq!(suggestion.kind.display_name(), "Extract Method");
        assert_eq!(suggestion.code_snippet.as_deref(), Some("fn a() {}"));
        assert!(suggestion.validate().is_ok());
    }

    #[test]
    fn suggestion_confidence_out_of_range_is_invalid() {
        let suggestion = Suggestion {
            id: "s2".to_string(),
            kind: SuggestionKind::Rename,
            description: "Rename".to_string(),
            confidence: 1.5,
            code_snippet: None,
            suggested_fix: None,
            file: None,
            line: None,
        };
        assert!(suggestion.validate().is_err());
    }
}
