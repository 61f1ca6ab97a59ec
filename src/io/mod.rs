//! Output files: the rendered document and the optional color export.

pub mod export;

pub use export::*;
