//! # yangkit-base
//!
//! Core library for loading, linking, and semantically analyzing YANG
//! schema modules.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! semantic → prefix, schema node-id, and typedef/grouping analysis
//!   ↓
//! project  → context registry, module loader, source providers
//!   ↓
//! schema   → modules, submodules, the schema node arena
//!   ↓
//! syntax   → statement keywords and YIN argument names
//!   ↓
//! base     → primitives (lexical cursor, revision dates)
//! ```
//!
//! Parsing and compilation are pluggable: the loader drives whatever
//! [`project::ModuleParser`] and [`project::SchemaCompiler`] it is given,
//! and everything else works on the parsed schema model.

/// Foundation types: lexical cursor, revision dates
pub mod base;

/// Error type shared across the crate
pub mod error;

/// Loading: context registry, source providers, the module loader
pub mod project;

/// Schema model: modules, submodules, nodes, typedefs
pub mod schema;

/// Semantic analysis: prefixes, schema node-ids, name collisions
pub mod semantic;

/// Statement keywords and YIN argument names
pub mod syntax;

// Re-export commonly needed items
pub use error::{Error, Result};
pub use project::{Context, ModuleLoader};
pub use schema::{Module, NodeId, NodeKind, Submodule};
pub use semantic::SchemaNodeRef;
