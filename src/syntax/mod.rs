//! Statement-level syntax definitions shared by both front ends.

mod keyword;

pub use keyword::{Keyword, YinArgument, match_argument, match_keyword};
