//! Color scales: the 7-color Greens palette and quantize scales over it.

pub mod palette;
pub mod quantize;

pub use palette::*;
pub use quantize::*;
