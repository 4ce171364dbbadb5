//! Ordering and grouping of AI refactoring suggestions.

use std::collections::BTreeMap;

use crate::domain::{Suggestion, SuggestionKind};
use crate::error::Result;

/// Order suggestions by confidence, highest first.
///
/// The sort is stable: suggestions with equal confidence keep their input
/// order.
pub fn rank(suggestions: &[Suggestion]) -> Result<Vec<Suggestion>> {
    for suggestion in suggestions {
        suggestion.validate()?;
    }
    let mut ranked = suggestions.to_vec();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(ranked)
}

/// Group ranked suggestions by kind, keeping rank order within each group.
pub fn group_by_kind(
    suggestions: &[Suggestion],
) -> Result<BTreeMap<SuggestionKind, Vec<Suggestion>>> {
    let mut groups: BTreeMap<SuggestionKind, Vec<Suggestion>> = BTreeMap::new();
    for suggestion in rank(suggestions)? {
        groups.entry(suggestion.kind).or_default().push(suggestion);
    }
    Ok(groups)
}
