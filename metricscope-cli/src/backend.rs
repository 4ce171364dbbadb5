//! Access to the metrics backend over HTTP.

use crate::CliResult;
use clap::Args;
use metricscope_core::{
    Issue, MetricSet, Suggestion, parse_issues, parse_metric_set, parse_suggestions,
};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// CLI arguments locating the metrics backend.
#[derive(Args, Clone, Debug)]
pub struct BackendArgs {
    /// Base URL of the metrics backend.
    #[arg(long, env = "METRICSCOPE_API_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,
}

/// Everything the backend reports about one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectData {
    /// Latest metric set.
    pub metrics: MetricSet,
    /// Open issues.
    pub issues: Vec<Issue>,
    /// Refactoring suggestions.
    pub suggestions: Vec<Suggestion>,
}

/// Backend operations used by the CLI.
pub trait BackendClient: Sync {
    /// Fetch the latest metrics for a project.
    fn fetch_metrics<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<MetricSet>> + Send + 'a>>;

    /// Fetch the open issues for a project.
    fn fetch_issues<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Issue>>> + Send + 'a>>;

    /// Fetch the refactoring suggestions for a project.
    fn fetch_suggestions<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Suggestion>>> + Send + 'a>>;
}

/// Reqwest-backed backend client.
pub struct ReqwestBackendClient {
    client: Client,
}

impl ReqwestBackendClient {
    /// Build a new reqwest backend client.
    pub fn new() -> CliResult<Self> {
        let client = Client::builder().user_agent("metricscope-cli").build()?;
        Ok(Self { client })
    }
}

impl BackendClient for ReqwestBackendClient {
    fn fetch_metrics<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<MetricSet>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(server_url, "sonarqube/metrics", project);
            let raw = fetch_text(&self.client, url).await?;
            Ok(parse_metric_set(&raw)?)
        })
    }

    fn fetch_issues<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Issue>>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(server_url, "sonarqube/issues", project);
            let raw = fetch_text(&self.client, url).await?;
            Ok(parse_issues(&raw)?)
        })
    }

    fn fetch_suggestions<'a>(
        &'a self,
        server_url: &'a str,
        project: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<Suggestion>>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(server_url, "ai/suggestions", project);
            let raw = fetch_text(&self.client, url).await?;
            Ok(parse_suggestions(&raw)?)
        })
    }
}

/// Fetch metrics, issues, and suggestions concurrently.
///
/// Fails as soon as any request fails; partial data is never returned.
pub async fn fetch_project<C: BackendClient>(
    client: &C,
    server_url: &str,
    project: &str,
) -> CliResult<ProjectData> {
    let server_url = normalize_server_url(server_url)?;
    let project = normalize_project_id(project)?;
    let (metrics, issues, suggestions) = tokio::try_join!(
        client.fetch_metrics(&server_url, &project),
        client.fetch_issues(&server_url, &project),
        client.fetch_suggestions(&server_url, &project),
    )?;
    log::info!(
        "fetched project {project}: {} issues, {} suggestions",
        issues.len(),
        suggestions.len()
    );
    Ok(ProjectData {
        metrics,
        issues,
        suggestions,
    })
}

/// Normalize the server URL for consistent API requests.
fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Project identifiers are used as a single path segment.
fn normalize_project_id(project: &str) -> CliResult<String> {
    let trimmed = project.trim();
    if trimmed.is_empty() {
        return Err("project id is required".into());
    }
    if trimmed
        .chars()
        .any(|ch| ch == '/' || ch == '?' || ch == '#' || ch.is_whitespace())
    {
        return Err(format!("project id {trimmed:?} is not a valid path segment").into());
    }
    if trimmed.chars().all(|ch| ch == '.') {
        return Err(format!("project id {trimmed:?} is a relative path segment").into());
    }
    Ok(trimmed.to_string())
}

fn endpoint(server_url: &str, resource: &str, project: &str) -> String {
    format!("{server_url}/{resource}/{project}")
}

async fn fetch_text(client: &Client, url: String) -> CliResult<String> {
    log::debug!("GET {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}
