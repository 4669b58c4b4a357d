//! Model creation and mutation actions.

use super::args;
use crate::error::{ExecutionError, ValidationError};
use crate::registry::Executable;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelCreateArgs {
    name: String,
    #[serde(default)]
    elevation: f64,
}

/// `level.create` - adds a named level at an elevation.
pub fn level_create(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: LevelCreateArgs = args::parse("level.create", raw)?;
    args::require_non_empty("level.create", "name", &parsed.name)?;

    Ok(Box::new(move |doc| {
        doc.add_level(&parsed.name, parsed.elevation)
            .map_err(ExecutionError::from)?;
        Ok(json!({
            "level": parsed.name,
            "elevation": parsed.elevation,
        }))
    }))
}

fn default_wall_type() -> String {
    "Generic - 200mm".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WallCreateArgs {
    level: String,
    #[serde(default = "default_wall_type")]
    type_name: String,
    start: [f64; 2],
    end: [f64; 2],
    height: f64,
}

/// `wall.create` - places a wall between two plan points on a level.
pub fn wall_create(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: WallCreateArgs = args::parse("wall.create", raw)?;
    args::require_positive("wall.create", "height", parsed.height)?;
    if parsed.start == parsed.end {
        return Err(ValidationError::bad_arguments(
            "wall.create",
            "start and end must differ",
        ));
    }

    Ok(Box::new(move |doc| {
        let id = doc
            .create_element("Walls", &parsed.type_name, Some(&parsed.level))
            .map_err(ExecutionError::from)?;

        let dx = parsed.end[0] - parsed.start[0];
        let dy = parsed.end[1] - parsed.start[1];
        let length = (dx * dx + dy * dy).sqrt();

        doc.set_parameter(id, "Height", json!(parsed.height))
            .map_err(ExecutionError::from)?;
        doc.set_parameter(id, "Length", json!(length))
            .map_err(ExecutionError::from)?;
        doc.set_parameter(id, "Start", json!(parsed.start))
            .map_err(ExecutionError::from)?;
        doc.set_parameter(id, "End", json!(parsed.end))
            .map_err(ExecutionError::from)?;

        Ok(json!({
            "elementId": id,
            "length": length,
        }))
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementDeleteArgs {
    element_id: u64,
}

/// `element.delete` - removes one element from the document.
pub fn element_delete(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: ElementDeleteArgs = args::parse("element.delete", raw)?;
    let id = args::element_id(parsed.element_id);

    Ok(Box::new(move |doc| {
        let removed = doc.delete_element(id).map_err(ExecutionError::from)?;
        Ok(json!({
            "deleted": removed.id,
            "category": removed.category,
        }))
    }))
}
