//! Document model and transaction semantics.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors raised by document operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// Referenced level does not exist in the document.
    #[error("Level '{0}' not found")]
    UnknownLevel(String),

    /// A level with this name already exists.
    #[error("Level '{0}' already exists")]
    DuplicateLevel(String),

    /// Referenced element does not exist in the document.
    #[error("Element {0} not found")]
    UnknownElement(ElementId),

    /// The element has no parameter with this name.
    #[error("Element {element} has no parameter '{name}'")]
    UnknownParameter { element: ElementId, name: String },
}

/// Unique identifier for a document element.
///
/// Ids are assigned monotonically by the document and are never reused,
/// even after the element is deleted.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Returns the raw numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A named horizontal datum elements can be hosted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    /// Level name, unique per document.
    pub name: String,
    /// Elevation in document units.
    pub elevation: f64,
}

/// A placed model element: category, type, hosting level, parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Document-unique identifier.
    pub id: ElementId,
    /// Category name (e.g. `Walls`, `Doors`, `Pipes`).
    pub category: String,
    /// Type name within the category.
    pub type_name: String,
    /// Hosting level, when the element is level-based.
    pub level: Option<String>,
    /// Named parameter values.
    pub parameters: BTreeMap<String, Value>,
}

/// The live, mutable host document.
///
/// Owned exclusively by the execution loop; all mutation happens through
/// [`Document::transaction`] so errors roll the document back to the
/// state before the failing unit of work.
#[derive(Debug, Clone, Default)]
pub struct Document {
    levels: BTreeMap<String, Level>,
    elements: BTreeMap<ElementId, Element>,
    next_id: u64,
    active_view: String,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            elements: BTreeMap::new(),
            next_id: 1,
            active_view: "{3D}".to_string(),
        }
    }

    /// Creates a small demo document with two levels and a few elements.
    ///
    /// Used by the CLI's `--seed-demo` flag so query actions have
    /// something to return on a fresh start.
    pub fn sample() -> Self {
        let mut doc = Self::new();
        doc.add_level("Level 1", 0.0).expect("fresh document");
        doc.add_level("Level 2", 3.0).expect("fresh document");
        for _ in 0..4 {
            let id = doc
                .create_element("Walls", "Generic - 200mm", Some("Level 1"))
                .expect("level exists");
            doc.set_parameter(id, "Height", Value::from(3.0))
                .expect("element exists");
        }
        let door = doc
            .create_element("Doors", "Single-Flush 0915", Some("Level 1"))
            .expect("level exists");
        doc.set_parameter(door, "Width", Value::from(0.915))
            .expect("element exists");
        doc
    }

    /// Runs `f` as one atomic unit of work.
    ///
    /// On `Ok` the mutations are kept; on `Err` the document is restored
    /// to its state before `f` ran, so a failing action leaves no partial
    /// mutation. Rollback is snapshot-based: the model is small enough
    /// that a clone per job is cheaper than journaling every mutation.
    pub fn transaction<T, E>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => {
                debug!(transaction = %name, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                *self = snapshot;
                debug!(transaction = %name, "Transaction rolled back");
                Err(e)
            }
        }
    }

    /// Adds a level. Fails if a level with the same name exists.
    pub fn add_level(&mut self, name: &str, elevation: f64) -> Result<(), HostError> {
        if self.levels.contains_key(name) {
            return Err(HostError::DuplicateLevel(name.to_string()));
        }
        self.levels.insert(
            name.to_string(),
            Level {
                name: name.to_string(),
                elevation,
            },
        );
        Ok(())
    }

    /// Returns all levels, ordered by name.
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    /// Returns true if a level with this name exists.
    pub fn has_level(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// Creates an element, validating the hosting level when given.
    pub fn create_element(
        &mut self,
        category: &str,
        type_name: &str,
        level: Option<&str>,
    ) -> Result<ElementId, HostError> {
        if let Some(level_name) = level {
            if !self.has_level(level_name) {
                return Err(HostError::UnknownLevel(level_name.to_string()));
            }
        }
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            Element {
                id,
                category: category.to_string(),
                type_name: type_name.to_string(),
                level: level.map(str::to_string),
                parameters: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// Removes an element, returning it.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Element, HostError> {
        self.elements
            .remove(&id)
            .ok_or(HostError::UnknownElement(id))
    }

    /// Looks up an element by id.
    pub fn element(&self, id: ElementId) -> Result<&Element, HostError> {
        self.elements.get(&id).ok_or(HostError::UnknownElement(id))
    }

    /// Returns all elements, ordered by id.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Returns the number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Returns the distinct category names present, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .elements
            .values()
            .map(|e| e.category.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Sets a parameter on an element, creating it if absent.
    pub fn set_parameter(
        &mut self,
        id: ElementId,
        name: &str,
        value: Value,
    ) -> Result<(), HostError> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(HostError::UnknownElement(id))?;
        element.parameters.insert(name.to_string(), value);
        Ok(())
    }

    /// Reads a parameter from an element.
    pub fn parameter(&self, id: ElementId, name: &str) -> Result<&Value, HostError> {
        let element = self.element(id)?;
        element
            .parameters
            .get(name)
            .ok_or_else(|| HostError::UnknownParameter {
                element: id,
                name: name.to_string(),
            })
    }

    /// Returns the name of the active view.
    pub fn active_view(&self) -> &str {
        &self.active_view
    }
}
