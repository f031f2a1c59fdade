//! Semantic analysis over loaded modules.
//!
//! - [`module_for_prefix`] / [`submodule_for_prefix`]: prefix resolution
//! - [`resolve_schema_nodeid`]: schema node-id resolution
//! - [`find_typedef`], [`check_typedefs`], [`check_groupings`]: type and
//!   grouping name analysis
//! - [`check_status`]: status consistency between definitions

mod nodeid;
mod prefix;
mod status;
mod typedefs;

pub use nodeid::{ResolveFlags, SchemaNodeRef, resolve_schema_nodeid};
pub use prefix::{check_prefix, module_for_prefix, submodule_for_prefix};
pub use status::check_status;
pub use typedefs::{TypeMatch, check_groupings, check_typedefs, find_typedef};
