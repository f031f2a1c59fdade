//! Loading infrastructure.
//!
//! - [`Context`]: the module registry plus loading configuration
//! - [`ModuleLoader`]: demand loading with cycle detection and clean failure
//! - [`SourceCallback`] and the search directories: the two source providers
//! - [`ModuleParser`] / [`SchemaCompiler`]: the pluggable text and
//!   compilation stages

mod context;
mod loader;
mod searchdir;
mod source;

pub use context::{Context, ContextFlags, LoadState};
pub use loader::{ModuleLoader, ModuleParser, SchemaCompiler};
pub use searchdir::search_localfile;
pub use source::{ModuleSource, SchemaFormat, SourceCallback};
