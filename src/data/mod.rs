//! Dataset acquisition and decoding.
//!
//! - `source`: fetch the two JSON payloads (HTTP or local file)
//! - `education`: the fips → record index
//! - `topology`: topology document → county/state geometry

pub mod education;
pub mod source;
pub mod topology;

pub use education::*;
pub use source::*;
pub use topology::*;
