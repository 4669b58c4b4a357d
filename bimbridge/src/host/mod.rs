//! In-memory host document model.
//!
//! The real host is a desktop BIM application whose document can only be
//! mutated from one logical thread. This module provides the document
//! stand-in the execution loop owns exclusively: levels, elements with
//! parameters, and snapshot-based transactions so a failing action leaves
//! no partial mutation behind.
//!
//! The document never escapes the execution loop; action executables
//! receive `&mut Document` only for the duration of one invocation.

mod document;

pub use document::{Document, Element, ElementId, HostError, Level};
