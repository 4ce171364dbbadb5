#![deny(missing_docs)]
//! MetricScope command-line interface.
//!
//! Classifies metric snapshots, compares merge requests against a quality
//! gate, aggregates history into trends, and ranks refactoring suggestions.

mod backend;

use backend::{BackendArgs, BackendClient, fetch_project};
use clap::{Args, Parser, Subcommand, ValueEnum};
use metricscope_core::report::{direction_label, impact_label};
use metricscope_core::{
    Classification, Direction, Issue, MergeRequestReport, MetricRegistry, ProjectReport,
    SeverityCounts, Settings, StdFileSystem, Suggestion, TrendSeries, aggregate, classify_set,
    contract_openapi_json, format_change, format_value, group_by_kind, load_history, load_issues,
    load_metric_set, load_settings, load_suggestions, rank, render_json,
    render_merge_request_markdown, render_project_markdown, render_trend_markdown,
    severity_counts, sort_by_severity,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "metricscope", version, about = "MetricScope CLI")]
struct Cli {
    /// Settings file with threshold overrides, gate policy, and trend options.
    #[arg(long, global = true, env = "METRICSCOPE_SETTINGS")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every metric in a metric set file.
    Classify {
        /// Metric set JSON file.
        #[arg(long)]
        metrics: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Compare a merge request's head metrics against its base.
    Diff {
        /// Base branch metric set JSON file.
        #[arg(long)]
        base: PathBuf,
        /// Head metric set JSON file.
        #[arg(long)]
        head: PathBuf,
        /// Title shown in the report.
        #[arg(long, default_value = "Merge request")]
        title: String,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Aggregate a snapshot history into per-metric trends.
    Trend {
        /// Snapshot history JSON file.
        #[arg(long)]
        history: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Rank refactoring suggestions by confidence.
    Suggestions {
        /// Suggestions JSON file.
        #[arg(long)]
        input: PathBuf,
        /// Group suggestions by kind.
        #[arg(long)]
        group: bool,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Summarise issues by severity.
    Issues {
        /// Issues JSON file.
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Fetch a project overview from the metrics backend.
    Overview {
        /// Project identifier known to the backend.
        #[arg(long)]
        project: String,
        #[command(flatten)]
        backend: BackendArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Print the OpenAPI schemas of the backend payloads.
    Schema {
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<std::process::ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let settings = resolve_settings(cli.settings.as_deref())?;

    let passed = match cli.command {
        Commands::Classify { metrics, report } => {
            run_classify(&settings, &metrics, &report).await?;
            true
        }
        Commands::Diff {
            base,
            head,
            title,
            report,
        } => run_diff(&settings, &base, &head, &title, &report).await?,
        Commands::Trend { history, report } => {
            run_trend(&settings, &history, &report).await?;
            true
        }
        Commands::Suggestions {
            input,
            group,
            report,
        } => {
            run_suggestions(&input, group, &report).await?;
            true
        }
        Commands::Issues { input, report } => {
            run_issues(&input, &report).await?;
            true
        }
        Commands::Overview {
            project,
            backend: target,
            report,
        } => {
            let client = backend::ReqwestBackendClient::new()?;
            run_overview(&client, &settings, &target.server_url, &project, &report).await?;
            true
        }
        Commands::Schema { report } => {
            run_schema(&report).await?;
            true
        }
    };

    Ok(if passed {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    })
}

#[cfg(test)]
fn main() {}

/// Load settings from the given file, or the defaults when none is given.
fn resolve_settings(path: Option<&Path>) -> CliResult<Settings> {
    match path {
        Some(path) => {
            log::debug!("loading settings from {}", path.display());
            Ok(load_settings(&StdFileSystem::new(), path)?)
        }
        None => Ok(Settings::default()),
    }
}

async fn run_classify(settings: &Settings, metrics: &Path, report: &OutputArgs) -> CliResult<()> {
    let registry = settings.registry()?;
    let metrics = load_metric_set(&StdFileSystem::new(), metrics)?;
    let classifications = classify_set(&registry, &metrics)?;
    let contents = match report.format {
        OutputFormat::Text => render_classifications_text(&registry, &classifications),
        OutputFormat::Markdown => render_classifications_markdown(&registry, &classifications),
        OutputFormat::Json => render_json(&classifications)?,
    };
    emit_output(report, contents).await
}

/// Returns whether the merge request passed the gate.
async fn run_diff(
    settings: &Settings,
    base: &Path,
    head: &Path,
    title: &str,
    report: &OutputArgs,
) -> CliResult<bool> {
    let registry = settings.registry()?;
    let fs = StdFileSystem::new();
    let base = load_metric_set(&fs, base)?;
    let head = load_metric_set(&fs, head)?;
    let mr = MergeRequestReport::build(title, &registry, &base, &head, &settings.gate)?;
    if !mr.gate.passed {
        log::warn!(
            "quality gate failed for {title}: {}",
            violation_labels(&registry, &mr)
        );
    }
    let contents = match report.format {
        OutputFormat::Text => render_merge_request_text(&registry, &mr),
        OutputFormat::Markdown => render_merge_request_markdown(&registry, &mr),
        OutputFormat::Json => render_json(&mr)?,
    };
    emit_output(report, contents).await?;
    Ok(mr.gate.passed)
}

async fn run_trend(settings: &Settings, history: &Path, report: &OutputArgs) -> CliResult<()> {
    let registry = settings.registry()?;
    let history = load_history(&StdFileSystem::new(), history)?;
    let series = aggregate(&registry, &history, &settings.trend)?;
    let contents = match report.format {
        OutputFormat::Text => render_trend_text(&registry, &series),
        OutputFormat::Markdown => render_trend_markdown(&registry, &series),
        OutputFormat::Json => render_json(&series)?,
    };
    emit_output(report, contents).await
}

async fn run_suggestions(input: &Path, group: bool, report: &OutputArgs) -> CliResult<()> {
    let suggestions = load_suggestions(&StdFileSystem::new(), input)?;
    let contents = if group {
        let groups = group_by_kind(&suggestions)?;
        match report.format {
            OutputFormat::Json => render_json(&groups)?,
            OutputFormat::Text | OutputFormat::Markdown => {
                let mut output = String::new();
                for (kind, members) in &groups {
                    let _ = writeln!(output, "## {} ({})\n", kind.display_name(), members.len());
                    output.push_str(&render_suggestions_text(members));
                    let _ = writeln!(output);
                }
                output
            }
        }
    } else {
        let ranked = rank(&suggestions)?;
        match report.format {
            OutputFormat::Json => render_json(&ranked)?,
            OutputFormat::Text | OutputFormat::Markdown => render_suggestions_text(&ranked),
        }
    };
    emit_output(report, contents).await
}

#[derive(Serialize)]
struct IssueSummary {
    counts: SeverityCounts,
    issues: Vec<Issue>,
}

async fn run_issues(input: &Path, report: &OutputArgs) -> CliResult<()> {
    let issues = load_issues(&StdFileSystem::new(), input)?;
    let summary = IssueSummary {
        counts: severity_counts(&issues),
        issues: sort_by_severity(&issues),
    };
    let contents = match report.format {
        OutputFormat::Json => render_json(&summary)?,
        OutputFormat::Text | OutputFormat::Markdown => render_issues_text(&summary),
    };
    emit_output(report, contents).await
}

async fn run_overview<C: BackendClient>(
    client: &C,
    settings: &Settings,
    server_url: &str,
    project: &str,
    report: &OutputArgs,
) -> CliResult<()> {
    let registry = settings.registry()?;
    let data = fetch_project(client, server_url, project).await?;
    let overview = ProjectReport::build(
        project,
        &registry,
        data.metrics,
        &data.issues,
        &data.suggestions,
    )?;
    let contents = match report.format {
        OutputFormat::Text => render_project_text(&registry, &overview),
        OutputFormat::Markdown => render_project_markdown(&registry, &[overview]),
        OutputFormat::Json => render_json(&overview)?,
    };
    emit_output(report, contents).await
}

/// The contract is always rendered as JSON.
async fn run_schema(report: &OutputArgs) -> CliResult<()> {
    emit_output(report, contract_openapi_json()?).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn violation_labels(registry: &MetricRegistry, report: &MergeRequestReport) -> String {
    report
        .gate
        .violations
        .iter()
        .map(|key| registry.spec(*key).label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn threshold_text(registry: &MetricRegistry, classification: &Classification) -> String {
    let spec = registry.spec(classification.metric);
    let Some(tiers) = spec.tiers else {
        return String::new();
    };
    let op = match spec.direction {
        Direction::LowerIsBetter => "<=",
        Direction::HigherIsBetter => ">=",
    };
    format!(
        " (good {op} {}, acceptable {op} {})",
        format_value(spec.key, tiers.good),
        format_value(spec.key, tiers.acceptable)
    )
}

fn render_classifications_text(
    registry: &MetricRegistry,
    classifications: &[Classification],
) -> String {
    let mut output = String::new();
    for classification in classifications {
        let spec = registry.spec(classification.metric);
        let _ = writeln!(
            output,
            "{:<5} {:>10}  {}{}",
            spec.label,
            format_value(classification.metric, classification.value),
            classification.label,
            threshold_text(registry, classification),
        );
    }
    output
}

fn render_classifications_markdown(
    registry: &MetricRegistry,
    classifications: &[Classification],
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "| Metric | Description | Value | Status |");
    let _ = writeln!(output, "|---|---|---|---|");
    for classification in classifications {
        let spec = registry.spec(classification.metric);
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            spec.label,
            spec.description,
            format_value(classification.metric, classification.value),
            classification.label,
        );
    }
    output
}

fn render_merge_request_text(registry: &MetricRegistry, report: &MergeRequestReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Merge request: {}", report.title);
    if report.gate.passed {
        let _ = writeln!(output, "Gate: passed");
    } else {
        let _ = writeln!(
            output,
            "Gate: failed ({})",
            violation_labels(registry, report)
        );
    }
    for (entry, assessment) in report.delta.iter().zip(&report.assessments) {
        let _ = writeln!(
            output,
            "{:<5} {:>10} -> {:>10}  {:>8}  {}",
            registry.spec(entry.metric).label,
            format_value(entry.metric, entry.base),
            format_value(entry.metric, entry.head),
            format_change(entry.metric, entry.change),
            impact_label(assessment.impact),
        );
    }
    output
}

fn render_trend_text(registry: &MetricRegistry, series: &TrendSeries) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Snapshots: {}", series.len());
    for trend in series.iter() {
        let summary = &trend.summary;
        let _ = writeln!(
            output,
            "{:<5} {:>10} -> {:>10}  {:>8}  {} ({:+.3}/day)",
            registry.spec(trend.metric).label,
            format_value(trend.metric, summary.first),
            format_value(trend.metric, summary.last),
            format_change(trend.metric, summary.change),
            direction_label(trend.direction),
            trend.slope_per_day,
        );
    }
    output
}

fn render_suggestions_text(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "Suggestions: none\n".to_string();
    }
    let mut output = String::new();
    for suggestion in suggestions {
        let _ = write!(
            output,
            "- [{:.0}%] {}: {}",
            suggestion.confidence * 100.0,
            suggestion.kind.display_name(),
            suggestion.description
        );
        if let Some(file) = &suggestion.file {
            let _ = write!(output, " ({file}");
            if let Some(line) = suggestion.line {
                let _ = write!(output, ":{line}");
            }
            let _ = write!(output, ")");
        }
        let _ = writeln!(output);
    }
    output
}

fn render_issues_text(summary: &IssueSummary) -> String {
    let mut output = String::new();
    let counts = &summary.counts;
    let _ = writeln!(
        output,
        "Issues: {} (critical {}, high {}, medium {}, low {}, info {})",
        counts.total, counts.critical, counts.high, counts.medium, counts.low, counts.info
    );
    for issue in &summary.issues {
        let _ = write!(
            output,
            "- [{}] {}:{}",
            issue.severity, issue.file, issue.line
        );
        if let Some(column) = issue.column {
            let _ = write!(output, ":{column}");
        }
        let _ = writeln!(output, " {} ({})", issue.message, issue.rule);
    }
    output
}

fn render_project_text(registry: &MetricRegistry, report: &ProjectReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Project: {}", report.project);
    let _ = writeln!(output);
    output.push_str(&render_classifications_text(
        registry,
        &report.classifications,
    ));
    let _ = writeln!(output);
    output.push_str(&render_issues_text(&IssueSummary {
        counts: report.issue_counts,
        issues: report.issues.clone(),
    }));
    let _ = writeln!(output);
    output.push_str(&render_suggestions_text(&report.suggestions));
    output
}
