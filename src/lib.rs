//! `edu-choropleth` library crate.
//!
//! The binary (`choro`) is a thin wrapper around this library so that:
//!
//! - the fetch/join/render pipeline is testable without spawning processes
//! - the SVG/HTML writers and the terminal preview share one data path

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod render;
pub mod report;
pub mod scale;
pub mod spatial;
pub mod tooltip;
pub mod tui;
