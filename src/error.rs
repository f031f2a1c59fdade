//! Crate-wide error taxonomy.
//!
//! Every fallible operation in this crate classifies its failure into one of the
//! variants below. Callers either forward an error unchanged or annotate it with
//! [`Error::context`]; nothing downgrades an error to keep going, with the single
//! exception of filename/latest-revision heuristics in the loader, which are
//! logged as warnings instead of raised.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classification for schema loading and resolution.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed identifier, path, date, or statement structure.
    #[error("{0}")]
    InvalidSyntax(String),

    /// A module, prefix, typedef, or schema node could not be resolved.
    #[error("{0}")]
    NotFound(String),

    /// A policy violation, such as implementing two revisions of one module or
    /// ending a schema node-id on a node of an unaccepted kind.
    #[error("{0}")]
    Denied(String),

    /// A name collision between prefixes, typedefs, or groupings.
    #[error("{0}")]
    AlreadyExists(String),

    /// A re-entrant module or submodule load (dependency cycle).
    #[error("{0}")]
    Circular(String),

    /// Filesystem or source-provider failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Prepends a "while doing X" annotation, preserving the classification.
    ///
    /// I/O errors pass through untouched; their source already names the
    /// underlying failure.
    #[must_use]
    pub fn context(self, what: &str) -> Self {
        match self {
            Self::InvalidSyntax(msg) => Self::InvalidSyntax(format!("{what}: {msg}")),
            Self::NotFound(msg) => Self::NotFound(format!("{what}: {msg}")),
            Self::Denied(msg) => Self::Denied(format!("{what}: {msg}")),
            Self::AlreadyExists(msg) => Self::AlreadyExists(format!("{what}: {msg}")),
            Self::Circular(msg) => Self::Circular(format!("{what}: {msg}")),
            Self::Io(err) => Self::Io(err),
        }
    }
}
