//! Terminal output: run summaries and single-county lookups.
//!
//! Formatting lives here so the pipeline stays free of presentation code.

pub mod format;

pub use format::*;
