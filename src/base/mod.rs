//! Foundation types for the yangkit toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Cursor`], [`NameRef`] - Lexical cursor and `[prefix:]name` tokens
//! - [`RevisionDate`] - Validated `YYYY-MM-DD` revision dates
//!
//! This module has NO dependencies on other yangkit modules besides `error`.

mod cursor;
mod revision;

pub use cursor::{Cursor, NameRef};
pub use revision::{RevisionDate, sort_revisions};

// Re-export the offset type used by the cursor for convenience
pub use text_size::TextSize;
