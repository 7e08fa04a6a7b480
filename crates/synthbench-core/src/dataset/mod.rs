//! Problem dataset
//!
//! Problems are loaded once from a JSONL file into validated, read-only
//! values; nothing downstream ever re-parses the source file.

mod loader;
mod problem;

pub use loader::{Dataset, DatasetStats};
pub use problem::Problem;

#[cfg(test)]
pub(crate) use problem::test_support;
