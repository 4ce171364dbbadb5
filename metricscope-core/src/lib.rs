#![deny(missing_docs)]
//! MetricScope core library.
//!
//! This crate turns raw software metrics produced by an analysis backend into
//! status tiers, merge-request deltas and gate decisions, historical trends,
//! and ranked refactoring suggestions. Every operation is a pure function of
//! its inputs; fetching data is left to the caller.

pub mod classify;
pub mod contract;
pub mod delta;
pub mod domain;
pub mod error;
pub mod fs;
pub mod input;
pub mod issues;
pub mod ranking;
pub mod registry;
pub mod report;
pub mod settings;
pub mod trend;

pub use classify::{Classification, Tier, classify, classify_set, classify_str};
pub use contract::{BackendContract, contract_openapi_json};
pub use delta::{
    Delta, DeltaAssessment, DeltaImpact, GateMode, GateOutcome, GatePolicy, MetricChange, assess,
    diff, evaluate_gate,
};
pub use domain::{
    Issue, MetricKey, MetricSet, Severity, Snapshot, SnapshotSource, Suggestion, SuggestionKind,
};
pub use error::{MetricScopeError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use input::{
    load_history, load_issues, load_metric_set, load_suggestions, parse_history, parse_issues,
    parse_metric_set, parse_snapshot, parse_suggestions,
};
pub use issues::{SeverityCounts, severity_counts, sort_by_severity};
pub use ranking::{group_by_kind, rank};
pub use registry::{Direction, MetricRegistry, MetricSpec, TierBounds};
pub use report::{
    MergeRequestReport, ProjectReport, format_change, format_value, render_json,
    render_merge_request_markdown, render_project_markdown, render_trend_markdown,
};
pub use settings::{Settings, ThresholdOverride, ThresholdSettings, load_settings, parse_settings};
pub use trend::{MetricTrend, TrendDirection, TrendOptions, TrendPoint, TrendSeries, aggregate};
