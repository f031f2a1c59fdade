//! The schema data model.
//!
//! - [`Module`], [`Submodule`], [`Import`], [`Include`] - module graph units
//! - [`SchemaTree`], [`SchemaNode`], [`NodeId`] - the schema-node arena
//! - [`Typedef`], [`BuiltinType`], [`Status`] - type definitions

mod module;
mod node;
mod typedef;

pub use module::{Import, Include, LatestRevision, Module, Submodule};
pub use node::{ChildLookup, NodeId, NodeKind, NodeKindSet, SchemaNode, SchemaTree};
pub use typedef::{BuiltinType, Status, Typedef};
