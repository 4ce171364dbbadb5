//! Decoding of backend payloads.
//!
//! Structural problems (bad JSON, missing or mistyped fields) surface as
//! `MalformedSnapshot`; well-formed payloads with out-of-range numbers surface
//! as `InvalidValue`. Nothing is partially accepted.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{Issue, MetricSet, Snapshot, Suggestion};
use crate::error::{MetricScopeError, Result};
use crate::fs::FileSystem;

fn decode<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|err| MetricScopeError::MalformedSnapshot(format!("{what}: {err}")))
}

/// Decode and validate a metric set.
pub fn parse_metric_set(raw: &str) -> Result<MetricSet> {
    let metrics: MetricSet = decode(raw, "metrics")?;
    metrics.validate()?;
    Ok(metrics)
}

/// Decode and validate a single snapshot.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot> {
    let snapshot: Snapshot = decode(raw, "snapshot")?;
    snapshot.metrics.validate()?;
    Ok(snapshot)
}

/// Decode and validate a snapshot history. Order is preserved as given.
pub fn parse_history(raw: &str) -> Result<Vec<Snapshot>> {
    let history: Vec<Snapshot> = decode(raw, "history")?;
    for snapshot in &history {
        snapshot.metrics.validate()?;
    }
    Ok(history)
}

/// Decode a list of issues.
pub fn parse_issues(raw: &str) -> Result<Vec<Issue>> {
    decode(raw, "issues")
}

/// Decode and validate a list of suggestions.
pub fn parse_suggestions(raw: &str) -> Result<Vec<Suggestion>> {
    let suggestions: Vec<Suggestion> = decode(raw, "suggestions")?;
    for suggestion in &suggestions {
        suggestion.validate()?;
    }
    Ok(suggestions)
}

/// Read a metric set file.
pub fn load_metric_set<F: FileSystem>(fs: &F, path: &Path) -> Result<MetricSet> {
    parse_metric_set(&fs.read_to_string(path)?)
}

/// Read a history file.
pub fn load_history<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<Snapshot>> {
    parse_history(&fs.read_to_string(path)?)
}

/// Read an issues file.
pub fn load_issues<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<Issue>> {
    parse_issues(&fs.read_to_string(path)?)
}

/// Read a suggestions file.
pub fn load_suggestions<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<Suggestion>> {
    parse_suggestions(&fs.read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricKey, Severity, SuggestionKind};
    use crate::fs::MockFileSystem;

    const METRICS: &str =
        r#"{"noc":45,"rfc":24,"lcom":4.2,"wmc":12.5,"dit":3,"cc":7.8,"loc":12500}"#;

    #[test]
    fn parses_complete_metric_set() {
        let metrics = parse_metric_set(METRICS).expect("metrics");
        assert_eq!(metrics.get(MetricKey::Lcom), 4.2);
        assert_eq!(metrics.loc, 12_500);
    }

    #[test]
    fn missing_field_is_malformed() {
        let raw = r#"{"noc":45,"rfc":24,"lcom":4.2,"wmc":12.5,"dit":3,"cc":7.8}"#;
        let error = parse_metric_set(raw).expect_err("missing loc");
        match error {
            MetricScopeError::MalformedSnapshot(message) => assert!(message.contains("loc")),
            other => panic!("expected MalformedSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn wrong_types_and_bad_json_are_malformed() {
        for raw in [
            r#"{"noc":"many","rfc":24,"lcom":4.2,"wmc":12.5,"dit":3,"cc":7.8,"loc":1}"#,
            r#"{"noc":45,"rfc":24,"lcom":4.2,"wmc":12.5,"dit":3,"cc":7.8,"loc":10.5}"#,
            "[1, 2",
        ] {
            assert!(matches!(
                parse_metric_set(raw),
                Err(MetricScopeError::MalformedSnapshot(_))
            ));
        }
    }

    #[test]
    fn negative_metric_is_invalid() {
        let raw = r#"{"noc":45,"rfc":24,"lcom":-1,"wmc":12.5,"dit":3,"cc":7.8,"loc":1}"#;
        assert!(matches!(
            parse_metric_set(raw),
            Err(MetricScopeError::InvalidValue { field, .. }) if field == "lcom"
        ));
    }

    #[test]
    fn parses_history_in_given_order() {
        let raw = format!(
            r#"[{{"date":"2025-02-15","metrics":{METRICS}}},{{"date":"2025-01-15","metrics":{METRICS}}}]"#
        );
        let history = parse_history(&raw).expect("history");
        assert_eq!(history.len(), 2);
        assert!(history[0].taken_at > history[1].taken_at);
    }

    #[test]
    fn parses_snapshot_with_source() {
        let raw = format!(
            r#"{{"takenAt":"2025-06-09T10:15:00Z","source":{{"kind":"commit","sha":"abc123"}},"metrics":{METRICS}}}"#
        );
        let snapshot = parse_snapshot(&raw).expect("snapshot");
        assert!(snapshot.source.is_some());
    }

    #[test]
    fn parses_issues_and_rejects_unknown_severity() {
        let raw = r#"[{"id":"1","severity":"critical","message":"Method too complex","rule":"complexity","file":"src/Grades.java","line":87}]"#;
        let issues = parse_issues(raw).expect("issues");
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].column, None);

        let raw = r#"[{"id":"1","severity":"blocker","message":"m","rule":"r","file":"f","line":1}]"#;
        assert!(matches!(
            parse_issues(raw),
            Err(MetricScopeError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn parses_suggestions_and_validates_confidence() {
        let raw = r#"[{"id":"1","type":"simplify","description":"Flatten nesting","confidence":0.92}]"#;
        let suggestions = parse_suggestions(raw).expect("suggestions");
        assert_eq!(suggestions[0].kind, SuggestionKind::Simplify);

        let raw = r#"[{"id":"1","type":"simplify","description":"d","confidence":1.2}]"#;
        assert!(matches!(
            parse_suggestions(raw),
            Err(MetricScopeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn loaders_read_through_filesystem() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("head.json"))
            .returning(|_| Ok(METRICS.to_string()));
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("issues.json"))
            .returning(|_| Ok("[]".to_string()));
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("suggestions.json"))
            .returning(|_| Ok("[]".to_string()));
        fs.expect_read_to_string()
            .withf(|path| path == Path::new("history.json"))
            .returning(|_| Ok("[]".to_string()));

        let metrics = load_metric_set(&fs, Path::new("head.json")).expect("metrics");
        assert_eq!(metrics.cc, 7.8);
        assert!(load_issues(&fs, Path::new("issues.json")).expect("issues").is_empty());
        assert!(
            load_suggestions(&fs, Path::new("suggestions.json"))
                .expect("suggestions")
                .is_empty()
        );
        assert!(load_history(&fs, Path::new("history.json")).expect("history").is_empty());
    }
}
