//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - parses CLI arguments
//! - sets up logging
//! - resolves dataset sources
//! - runs the render pipeline and writes outputs

use std::path::Path;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::cli::{Cli, Command, LegendArgs, LookupArgs, RenderArgs, SourceArgs, TuiArgs};
use crate::data::Sources;
use crate::domain::RenderConfig;
use crate::error::{AppError, ErrorKind};
use crate::render::{legend_layout, svg};
use crate::scale::{QuantizeScale, Rgb};

pub mod pipeline;

const SUBCOMMANDS: [&str; 4] = ["render", "legend", "lookup", "tui"];

/// Entry point for the `choro` binary.
pub fn run() -> Result<(), AppError> {
    // `choro` and `choro --format html ...` behave like `choro render ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    let interactive = matches!(cli.command, Command::Tui(_));
    init_logging(log_level(cli.verbose, cli.quiet, interactive));

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Legend(args) => handle_legend(args),
        Command::Lookup(args) => handle_lookup(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// stderr level for the given flags. The TUI owns the screen, so it logs nothing.
fn log_level(verbose: u8, quiet: bool, interactive: bool) -> LevelFilter {
    if interactive {
        return LevelFilter::OFF;
    }
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

fn init_logging(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    let config = render_config_from_args(&args)?;
    pipeline::ensure_output_format(&config)?;
    let run = pipeline::run_render(&config)?;

    crate::io::write_document(&config.output, &run.document)?;
    if let Some(path) = &config.export_colors {
        crate::io::write_colors_csv(path, &run.scene.paints, &run.scene.index)?;
    }

    if config.summary {
        println!(
            "{}",
            crate::report::format_run_summary(&run.summary, &run.scene.scale, chrono::Local::now())
        );
        println!("Wrote {}", config.output.display());
    }
    Ok(())
}

fn handle_legend(args: LegendArgs) -> Result<(), AppError> {
    let legend = legend_layout(&QuantizeScale::legend_swatch());
    crate::io::write_document(&args.output, &svg::render_legend_svg(&legend))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn handle_lookup(args: LookupArgs) -> Result<(), AppError> {
    let sources = Sources::resolve(args.education.as_deref(), None);
    let index = pipeline::load_index(&sources.education)?;
    let record = index.lookup(args.fips)?;
    print!(
        "{}",
        crate::report::format_lookup(record, &QuantizeScale::map_fill())
    );
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(resolve_sources(&args.sources), args.missing)
}

fn resolve_sources(args: &SourceArgs) -> Sources {
    Sources::resolve(args.education.as_deref(), args.topology.as_deref())
}

pub fn render_config_from_args(args: &RenderArgs) -> Result<RenderConfig, AppError> {
    let sources = resolve_sources(&args.sources);
    let missing_fill = Rgb::from_hex(&args.missing_fill)?;
    if args.output.as_os_str().is_empty() {
        return Err(AppError::new(ErrorKind::Usage, "Output path must not be empty."));
    }
    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }
    Ok(RenderConfig {
        education: sources.education,
        topology: sources.topology,
        output: args.output.clone(),
        format: args.format,
        join_policy: args.missing,
        missing_fill,
        export_colors: args.export_colors.clone(),
        summary: !args.no_summary,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorKind::Usage,
            format!("Output directory '{}' does not exist.", dir.display()),
        ))
    }
}

/// Rewrite argv so `choro` defaults to `choro render`.
///
/// Rules:
/// - `choro`                       -> `choro render`
/// - `choro --format html ...`     -> `choro render --format html ...`
/// - `choro --help/--version/-h`   -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("render".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version || SUBCOMMANDS.contains(&arg1.as_str()) {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "render".to_string());
    }
    argv
}
