//! Domain action handlers and registry assembly.
//!
//! Each action conforms to the two-phase contract: the factory parses
//! and validates JSON arguments without touching the document, the
//! returned executable does the host work on the execution-loop task.
//! Argument field names are camelCase on the wire (`elementId`,
//! `typeName`), matching the source protocol.
//!
//! The registry is assembled explicitly in [`build_registry`] - there is
//! no ambient global table - and the `qto.*.count` wrappers show how
//! narrow variants are derived from a general handler by injecting a
//! fixed `category` argument.

mod args;
mod model;
mod params;
mod qto;
mod query;

use crate::registry::{with_fixed_args, ActionFactory, ActionRegistry, DuplicateAction, RegistryBuilder};
use serde_json::json;
use std::sync::Arc;

/// Builds the complete action table.
///
/// Fails fast on duplicate names: a duplicate is a startup-time
/// configuration error, not something to surface to network callers.
pub fn build_registry() -> Result<ActionRegistry, DuplicateAction> {
    let mut builder = RegistryBuilder::new();

    // --- Model ---
    builder.register("level.create", model::level_create)?;
    builder.register("wall.create", model::wall_create)?;
    builder.register("element.delete", model::element_delete)?;

    // --- Query ---
    builder.register("levels.list", query::levels_list)?;
    builder.register("elements.list", query::elements_list)?;
    builder.register("element.info", query::element_info)?;
    builder.register("categories.list", query::categories_list)?;
    builder.register("doc.info", query::doc_info)?;

    // --- Parameters ---
    builder.register("params.get", params::params_get)?;
    builder.register("params.set", params::params_set)?;

    // --- Quantity takeoff ---
    builder.register("qto.count", qto::count)?;

    // Category-pinned wrappers over the generic counter.
    let count: ActionFactory = Arc::new(qto::count);
    builder.register_arc(
        "qto.walls.count",
        with_fixed_args(count.clone(), json!({"category": "Walls"})),
    )?;
    builder.register_arc(
        "qto.doors.count",
        with_fixed_args(count.clone(), json!({"category": "Doors"})),
    )?;
    builder.register_arc(
        "qto.pipes.count",
        with_fixed_args(count, json!({"category": "Pipes"})),
    )?;

    Ok(builder.build())
}
