//! Read-only query actions.

use super::args;
use crate::error::{ExecutionError, ValidationError};
use crate::registry::Executable;
use serde::Deserialize;
use serde_json::{json, Value};

/// `levels.list` - all levels with elevations.
pub fn levels_list(_raw: &Value) -> Result<Executable, ValidationError> {
    Ok(Box::new(|doc| {
        let levels: Vec<Value> = doc
            .levels()
            .map(|l| json!({"name": l.name, "elevation": l.elevation}))
            .collect();
        Ok(json!({"levels": levels}))
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementsListArgs {
    category: Option<String>,
    level: Option<String>,
    limit: Option<usize>,
}

/// `elements.list` - elements, optionally filtered by category/level.
pub fn elements_list(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: ElementsListArgs = args::parse("elements.list", raw)?;

    Ok(Box::new(move |doc| {
        let limit = parsed.limit.unwrap_or(usize::MAX);
        let items: Vec<Value> = doc
            .elements()
            .filter(|e| {
                parsed
                    .category
                    .as_deref()
                    .map_or(true, |c| e.category == c)
            })
            .filter(|e| {
                parsed
                    .level
                    .as_deref()
                    .map_or(true, |l| e.level.as_deref() == Some(l))
            })
            .take(limit)
            .map(|e| {
                json!({
                    "elementId": e.id,
                    "category": e.category,
                    "typeName": e.type_name,
                    "level": e.level,
                })
            })
            .collect();
        Ok(json!({"count": items.len(), "elements": items}))
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementInfoArgs {
    element_id: u64,
}

/// `element.info` - one element with its full parameter map.
pub fn element_info(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: ElementInfoArgs = args::parse("element.info", raw)?;
    let id = args::element_id(parsed.element_id);

    Ok(Box::new(move |doc| {
        let element = doc.element(id).map_err(ExecutionError::from)?;
        Ok(json!({
            "elementId": element.id,
            "category": element.category,
            "typeName": element.type_name,
            "level": element.level,
            "parameters": element.parameters,
        }))
    }))
}

/// `categories.list` - distinct category names present, sorted.
pub fn categories_list(_raw: &Value) -> Result<Executable, ValidationError> {
    Ok(Box::new(|doc| Ok(json!({"categories": doc.categories()}))))
}

/// `doc.info` - document summary.
pub fn doc_info(_raw: &Value) -> Result<Executable, ValidationError> {
    Ok(Box::new(|doc| {
        Ok(json!({
            "elements": doc.element_count(),
            "levels": doc.levels().count(),
            "activeView": doc.active_view(),
        }))
    }))
}
