//! Metadata filter extraction from node parameters.
//!
//! Filters are advisory, not correctness-critical: missing or malformed
//! filter parameters yield an empty filter rather than an error.

use crate::core::vector_stores::MetadataFilter;
use crate::node::context::ExecutionContext;
use serde_json::Value;

/// Build a [`MetadataFilter`] from the node's `options.metadata` parameter.
///
/// The parameter is a user-declared list of `{name, value}` pairs under
/// `metadataValues`. Entries without a name or value are skipped; duplicate
/// names resolve last-write-wins. Returns `None` when nothing usable is
/// declared, so callers can distinguish "no filter" from an empty match-all.
#[must_use]
pub fn metadata_filters_from_parameters(
    context: &ExecutionContext,
    item_index: usize,
) -> Option<MetadataFilter> {
    let metadata = context.parameters().get("options.metadata", item_index)?;
    let values = metadata.get("metadataValues")?.as_array()?;

    let mut filter = MetadataFilter::new();
    for entry in values {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let Some(value) = entry.get("value") else {
            continue;
        };
        filter.insert(name.to_string(), value.clone());
    }

    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::context::{NodeParameters, NodeVersion};
    use serde_json::json;

    fn context_with_metadata(metadata: Value) -> ExecutionContext {
        ExecutionContext::new("Test Node", NodeVersion::V1_3).with_parameters(
            NodeParameters::new().with("options", json!({ "metadata": metadata })),
        )
    }

    #[test]
    fn test_builds_flat_filter() {
        let ctx = context_with_metadata(json!({
            "metadataValues": [
                {"name": "lang", "value": "rust"},
                {"name": "year", "value": 2025}
            ]
        }));
        let filter = metadata_filters_from_parameters(&ctx, 0).unwrap();
        assert_eq!(filter.get("lang"), Some(&json!("rust")));
        assert_eq!(filter.get("year"), Some(&json!(2025)));
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let ctx = context_with_metadata(json!({
            "metadataValues": [
                {"name": "lang", "value": "go"},
                {"name": "lang", "value": "rust"}
            ]
        }));
        let filter = metadata_filters_from_parameters(&ctx, 0).unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get("lang"), Some(&json!("rust")));
    }

    #[test]
    fn test_missing_parameter_yields_none() {
        let ctx = ExecutionContext::new("Test Node", NodeVersion::V1_3);
        assert!(metadata_filters_from_parameters(&ctx, 0).is_none());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let ctx = context_with_metadata(json!({
            "metadataValues": [
                {"value": "no name"},
                {"name": "", "value": "empty name"},
                {"name": "ok", "value": "kept"},
                {"name": "no-value"}
            ]
        }));
        let filter = metadata_filters_from_parameters(&ctx, 0).unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get("ok"), Some(&json!("kept")));
    }

    #[test]
    fn test_non_array_values_yield_none() {
        let ctx = context_with_metadata(json!({"metadataValues": "not-a-list"}));
        assert!(metadata_filters_from_parameters(&ctx, 0).is_none());
    }
}
