//! Report value objects and formatting utilities for MetricScope outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::classify::{Classification, classify_set};
use crate::delta::{
    Delta, DeltaAssessment, DeltaImpact, GateOutcome, GatePolicy, assess, diff, evaluate_gate,
};
use crate::domain::{Issue, MetricKey, MetricSet, Suggestion};
use crate::error::Result;
use crate::issues::{SeverityCounts, severity_counts, sort_by_severity};
use crate::ranking::rank;
use crate::registry::MetricRegistry;
use crate::trend::{TrendDirection, TrendSeries};

/// Current state of a project: classified metrics, issues, and suggestions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    /// Project name or identifier.
    pub project: String,
    /// Raw metric values.
    pub metrics: MetricSet,
    /// Classification of every metric.
    pub classifications: Vec<Classification>,
    /// Issue tallies by severity.
    pub issue_counts: SeverityCounts,
    /// Issues, worst first.
    pub issues: Vec<Issue>,
    /// Suggestions, most confident first.
    pub suggestions: Vec<Suggestion>,
}

impl ProjectReport {
    /// Classify metrics, order issues, and rank suggestions.
    pub fn build(
        project: impl Into<String>,
        registry: &MetricRegistry,
        metrics: MetricSet,
        issues: &[Issue],
        suggestions: &[Suggestion],
    ) -> Result<Self> {
        let classifications = classify_set(registry, &metrics)?;
        let suggestions = rank(suggestions)?;
        Ok(Self {
            project: project.into(),
            metrics,
            classifications,
            issue_counts: severity_counts(issues),
            issues: sort_by_severity(issues),
            suggestions,
        })
    }
}

/// Comparison of a merge request's head against its base.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequestReport {
    /// Merge request title or identifier.
    pub title: String,
    /// Per-metric changes.
    pub delta: Delta,
    /// Impact of every change.
    pub assessments: Vec<DeltaAssessment>,
    /// Gate decision.
    pub gate: GateOutcome,
}

impl MergeRequestReport {
    /// Diff two validated metric sets and apply the gate.
    pub fn build(
        title: impl Into<String>,
        registry: &MetricRegistry,
        base: &MetricSet,
        head: &MetricSet,
        policy: &GatePolicy,
    ) -> Result<Self> {
        base.validate()?;
        head.validate()?;
        let delta = diff(base, head);
        let gate = evaluate_gate(registry, &delta, policy)?;
        Ok(Self {
            title: title.into(),
            assessments: assess(registry, &delta),
            delta,
            gate,
        })
    }
}

/// Render project reports as Markdown.
pub fn render_project_markdown(registry: &MetricRegistry, reports: &[ProjectReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# MetricScope Project Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.project);
        append_classifications(&mut output, registry, &report.classifications);
        append_issues(&mut output, &report.issue_counts, &report.issues);
        append_suggestions(&mut output, &report.suggestions);
        let _ = writeln!(output);
    }
    output
}

/// Render a merge request comparison as Markdown.
pub fn render_merge_request_markdown(
    registry: &MetricRegistry,
    report: &MergeRequestReport,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# MetricScope Merge Request Report\n");
    let _ = writeln!(output, "## {}\n", report.title);
    let status = if report.gate.passed { "passed" } else { "failed" };
    let _ = writeln!(output, "- Analysis: {status}");
    if !report.gate.violations.is_empty() {
        let names: Vec<&str> = report
            .gate
            .violations
            .iter()
            .map(|key| registry.spec(*key).label)
            .collect();
        let _ = writeln!(output, "- Violations: {}", names.join(", "));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "| Metric | Base | Head | Change | Impact |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for (entry, assessment) in report.delta.iter().zip(&report.assessments) {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            registry.spec(entry.metric).label,
            format_value(entry.metric, entry.base),
            format_value(entry.metric, entry.head),
            format_change(entry.metric, entry.change),
            impact_label(assessment.impact),
        );
    }
    let _ = writeln!(output);
    output
}

/// Render trend series as Markdown.
pub fn render_trend_markdown(registry: &MetricRegistry, series: &TrendSeries) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# MetricScope Trend Report\n");
    let _ = writeln!(output, "Snapshots: {}\n", series.len());
    let _ = writeln!(output, "| Metric | First | Last | Change | Min | Max | Trend |");
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for trend in series.iter() {
        let summary = &trend.summary;
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} |",
            registry.spec(trend.metric).label,
            format_value(trend.metric, summary.first),
            format_value(trend.metric, summary.last),
            format_change(trend.metric, summary.change),
            format_value(trend.metric, summary.min),
            format_value(trend.metric, summary.max),
            direction_label(trend.direction),
        );
    }
    let _ = writeln!(output);
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(
    payload: &T,
) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Format a metric value: lines of code as an integer, others to one decimal.
pub fn format_value(metric: MetricKey, value: f64) -> String {
    match metric {
        MetricKey::Loc => format!("{value:.0}"),
        _ => format!("{value:.1}"),
    }
}

/// Format a signed change with an explicit `+` for increases.
pub fn format_change(metric: MetricKey, change: f64) -> String {
    if change == 0.0 {
        return format_value(metric, 0.0);
    }
    let formatted = format_value(metric, change);
    if change > 0.0 {
        format!("+{formatted}")
    } else {
        formatted
    }
}

/// Display label for a change impact.
pub fn impact_label(impact: DeltaImpact) -> &'static str {
    match impact {
        DeltaImpact::Improvement => "improvement",
        DeltaImpact::Neutral => "neutral",
        DeltaImpact::Regression => "regression",
    }
}

/// Display label for a trend direction.
pub fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Improving => "improving",
        TrendDirection::Worsening => "worsening",
        TrendDirection::Flat => "flat",
    }
}

fn append_classifications(
    output: &mut String,
    registry: &MetricRegistry,
    classifications: &[Classification],
) {
    let _ = writeln!(output, "### Metrics");
    for classification in classifications {
        let spec = registry.spec(classification.metric);
        let _ = writeln!(
            output,
            "- {} ({}): {} [{}]",
            spec.label,
            spec.description,
            format_value(classification.metric, classification.value),
            classification.label,
        );
    }
    let _ = writeln!(output);
}

fn append_issues(output: &mut String, counts: &SeverityCounts, issues: &[Issue]) {
    if issues.is_empty() {
        let _ = writeln!(output, "### Issues\nNo issues found.\n");
        return;
    }
    let _ = writeln!(output, "### Issues ({} found)", counts.total);
    for issue in issues {
        let _ = writeln!(
            output,
            "- [{}] {} ({}:{}, rule {})",
            issue.severity, issue.message, issue.file, issue.line, issue.rule
        );
    }
    let _ = writeln!(output);
}

fn append_suggestions(output: &mut String, suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        let _ = writeln!(output, "### Suggestions\nNo suggestions available.\n");
        return;
    }
    let _ = writeln!(output, "### Suggestions");
    for suggestion in suggestions {
        let _ = write!(
            output,
            "- {} ({:.0}%): {}",
            suggestion.kind.display_name(),
            suggestion.confidence * 100.0,
            suggestion.description
        );
        if let Some(file) = &suggestion.file {
            let _ = write!(output, " [{file}");
            if let Some(line) = suggestion.line {
                let _ = write!(output, ":{line}");
            }
            let _ = write!(output, "]");
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);
}
