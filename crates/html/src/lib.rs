//! In-memory document tree used as the CSS engine's node collaborator.
//!
//! Nodes live in an [`indextree`] arena. The tree carries what selector
//! matching reads (tags, attributes, script-visible properties, frame
//! boundaries) and what the cascade writes (per-element style maps, hover
//! effects, generated `::before`/`::after` text).

#![forbid(unsafe_code)]

pub mod dom;

pub use dom::{Document, DomNode, NodeKind, PropertyValue};
