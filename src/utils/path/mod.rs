//! Path utilities.
//!
//! - [`fs`]: filesystem path normalization (`normalize_path`)
//! - [`lexical`]: pure, non-touching path arithmetic (`clean`, `relative_to`, `to_url_path`)

pub mod fs;
pub mod lexical;

pub use fs::normalize_path;
pub use lexical::{clean, relative_to, to_url_path};
