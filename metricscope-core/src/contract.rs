//! OpenAPI schemas for the payloads the metrics backend must produce.

use utoipa::OpenApi;

use crate::domain::{
    Issue, MetricKey, MetricSet, Severity, Snapshot, SnapshotSource, Suggestion, SuggestionKind,
};

/// Backend contract document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MetricScope backend contract",
        description = "Payload shapes consumed by the MetricScope engine."
    ),
    components(schemas(
        MetricKey,
        MetricSet,
        Snapshot,
        SnapshotSource,
        Issue,
        Severity,
        Suggestion,
        SuggestionKind
    ))
)]
pub struct BackendContract;

/// Render the contract document as pretty JSON.
pub fn contract_openapi_json() -> Result<String, serde_json::Error> {
    BackendContract::openapi().to_pretty_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_lists_backend_payloads() {
        let doc = BackendContract::openapi();
        let components = doc.components.expect("components");
        for name in ["MetricSet", "Snapshot", "Issue", "Suggestion", "Severity"] {
            assert!(components.schemas.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn contract_json_marks_metric_fields_required() {
        let json = contract_openapi_json().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let required = value["components"]["schemas"]["MetricSet"]["required"]
            .as_array()
            .expect("required list");
        assert_eq!(required.len(), 7);
        assert!(required.iter().any(|field| field == "loc"));
    }
}
