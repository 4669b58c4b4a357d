//! Quantity-takeoff actions.

use super::args;
use crate::error::ValidationError;
use crate::registry::Executable;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountArgs {
    category: String,
    level: Option<String>,
    type_contains: Option<String>,
}

/// `qto.count` - counts elements in a category, optionally narrowed by
/// level and type-name substring.
///
/// The `qto.*.count` convenience names are wrappers over this factory
/// with a pinned `category` (see `actions::build_registry`).
pub fn count(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: CountArgs = args::parse("qto.count", raw)?;
    args::require_non_empty("qto.count", "category", &parsed.category)?;

    Ok(Box::new(move |doc| {
        let matched = doc
            .elements()
            .filter(|e| e.category == parsed.category)
            .filter(|e| {
                parsed
                    .level
                    .as_deref()
                    .map_or(true, |l| e.level.as_deref() == Some(l))
            })
            .filter(|e| {
                parsed
                    .type_contains
                    .as_deref()
                    .map_or(true, |t| e.type_name.contains(t))
            })
            .count();
        Ok(json!({
            "category": parsed.category,
            "count": matched,
        }))
    }))
}
