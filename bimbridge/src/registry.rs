//! Action registry: the string-keyed table of dispatchable operations.
//!
//! Every action has a two-phase contract:
//!
//! 1. The **factory** parses raw JSON arguments into an [`Executable`],
//!    failing fast with a [`ValidationError`]. It never touches the host,
//!    so malformed requests never occupy the execution loop.
//! 2. The **executable** runs once, on the execution-loop task, against
//!    the live document, and produces a JSON result or an
//!    [`ExecutionError`].
//!
//! The registry is built once at startup and read-only afterwards, so
//! lookups are pure reads needing no locking. Wrapper actions (narrow,
//! pre-configured variants of a general handler) are plain function
//! composition via [`with_fixed_args`], not a registry feature.

use crate::error::{ExecutionError, ValidationError};
use crate::host::Document;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Result of running an executable against the document.
pub type ActionResult = Result<Value, ExecutionError>;

/// Phase 2 of an action: runs once on the execution-loop task.
///
/// Executables receive the document only for the duration of one
/// invocation and must not retain it.
pub type Executable = Box<dyn FnOnce(&mut Document) -> ActionResult + Send + 'static>;

/// Phase 1 of an action: parses arguments into an executable.
pub type ActionFactory =
    Arc<dyn Fn(&Value) -> Result<Executable, ValidationError> + Send + Sync + 'static>;

/// Startup-time registration failure: two actions under one name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Action '{0}' is already registered")]
pub struct DuplicateAction(pub String);

/// Builder for the immutable [`ActionRegistry`].
///
/// Registration order does not matter; names are kept sorted.
#[derive(Default)]
pub struct RegistryBuilder {
    actions: BTreeMap<String, ActionFactory>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under a unique, case-sensitive name.
    ///
    /// Duplicate names are a configuration error and fail fast here,
    /// before the bridge ever accepts a request.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&Value) -> Result<Executable, ValidationError> + Send + Sync + 'static,
    ) -> Result<(), DuplicateAction> {
        self.register_arc(name, Arc::new(factory))
    }

    /// Registers an already-shared factory (used for wrapper actions
    /// that delegate to a base factory).
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        factory: ActionFactory,
    ) -> Result<(), DuplicateAction> {
        let name = name.into();
        if self.actions.contains_key(&name) {
            return Err(DuplicateAction(name));
        }
        self.actions.insert(name, factory);
        Ok(())
    }

    /// Finalizes the builder into a read-only registry.
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

/// Immutable, string-keyed map from action name to factory.
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// Looks up a factory by exact, case-sensitive name.
    ///
    /// On a miss the error carries near-miss suggestions so callers see
    /// what they probably meant instead of a silent no-op.
    pub fn lookup(&self, name: &str) -> Result<&ActionFactory, ValidationError> {
        self.actions
            .get(name)
            .ok_or_else(|| ValidationError::UnknownAction {
                name: name.to_string(),
                suggestions: self.suggestions_for(name),
            })
    }

    /// Returns all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    /// Returns the number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Finds up to three registered names that look close to `name`:
    /// same leading namespace segment, or containing the query.
    fn suggestions_for(&self, name: &str) -> Vec<String> {
        let prefix = name.split('.').next().unwrap_or(name);
        let mut near: Vec<String> = self
            .actions
            .keys()
            .filter(|candidate| {
                candidate.split('.').next() == Some(prefix)
                    || (!name.is_empty() && candidate.contains(name))
            })
            .take(3)
            .cloned()
            .collect();
        near.sort();
        near
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Derives a factory from `base` by overlaying `fixed` arguments over
/// whatever the caller supplied.
///
/// The fixed arguments win on key collision, so a wrapper like
/// `qto.walls.count` pins `category: "Walls"` regardless of caller input.
pub fn with_fixed_args(base: ActionFactory, fixed: Value) -> ActionFactory {
    Arc::new(move |args: &Value| {
        let mut merged = match args {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        if let Value::Object(fixed_map) = &fixed {
            for (key, value) in fixed_map {
                merged.insert(key.clone(), value.clone());
            }
        }
        base(&Value::Object(merged))
    })
}
