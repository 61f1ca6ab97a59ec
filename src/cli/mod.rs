//! Command-line parsing for the county education choropleth.
//!
//! Parsing stays separate from dispatch (`app`) and from rendering.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{Fips, JoinPolicy, OutputFormat};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "choro",
    version,
    about = "US county educational attainment choropleth (SVG/HTML + terminal preview)"
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both datasets and write the choropleth map.
    Render(RenderArgs),
    /// Write the legend alone (no datasets needed).
    Legend(LegendArgs),
    /// Print one county's record, bucket and color.
    Lookup(LookupArgs),
    /// Interactive terminal preview with a hover tooltip.
    Tui(TuiArgs),
}

/// Where to load the two datasets from. Each accepts a URL or a file path.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Education dataset (overrides CHORO_EDUCATION_URL).
    #[arg(long, value_name = "URL|PATH")]
    pub education: Option<String>,

    /// Topology dataset (overrides CHORO_TOPOLOGY_URL).
    #[arg(long, value_name = "URL|PATH")]
    pub topology: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output file.
    #[arg(short, long, default_value = "choropleth.svg")]
    pub output: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// What to do with counties that have no education record.
    #[arg(long, value_enum, default_value_t = JoinPolicy::Fail)]
    pub missing: JoinPolicy,

    /// Fill for unjoined counties under `--missing mark`.
    #[arg(long, default_value = "#cccccc")]
    pub missing_fill: String,

    /// Also write a fips → bucket → color CSV.
    #[arg(long = "export-colors", value_name = "CSV")]
    pub export_colors: Option<PathBuf>,

    /// Skip the terminal summary.
    #[arg(long)]
    pub no_summary: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// What to do with counties that have no education record.
    #[arg(long, value_enum, default_value_t = JoinPolicy::Fail)]
    pub missing: JoinPolicy,
}

#[derive(Debug, Args, Clone)]
pub struct LegendArgs {
    /// Output file.
    #[arg(short, long, default_value = "legend.svg")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    /// County FIPS code (e.g. 1001).
    #[arg(long)]
    pub fips: Fips,

    /// Education dataset (overrides CHORO_EDUCATION_URL).
    #[arg(long, value_name = "URL|PATH")]
    pub education: Option<String>,
}
