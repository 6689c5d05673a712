//! CLI entry point for tarncdu

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tarncdu::{
    ExportConfig, IndexOptions, ensure_index, export, read_index, render_json, write_json,
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "tarncdu")]
#[command(about = "Export the contents of a tar archive in ncdu's JSON format")]
#[command(version)]
struct Args {
    /// Archive to list (its index is cached as <ARCHIVE>.index)
    #[arg(required_unless_present = "index")]
    archive: Option<PathBuf>,

    /// Read an existing `tar -tv` listing instead of running tar
    #[arg(long = "index", value_name = "FILE")]
    index: Option<PathBuf>,

    /// Regenerate the cached index even if it exists
    #[arg(long = "refresh", conflicts_with = "index")]
    refresh: bool,

    /// Program used to list the archive
    #[arg(long = "tar", value_name = "PROGRAM", default_value = "tar")]
    tar: String,

    /// Write the export to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Include modification times (ncdu extended format)
    #[arg(short = 'e', long = "extended")]
    extended: bool,
}

fn main() {
    // Logs go to stderr so stdout stays valid JSON (respects RUST_LOG).
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("tarncdu: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> tarncdu::Result<()> {
    // Stamped once, before any work, so every run reports a single export time.
    let config = ExportConfig::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .with_extended(args.extended);

    let index = if let Some(index) = &args.index {
        index.clone()
    } else {
        let Some(archive) = &args.archive else {
            Args::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "either <ARCHIVE> or --index <FILE> is required",
                )
                .exit()
        };
        let options = IndexOptions {
            tar_program: args.tar.clone(),
            refresh: args.refresh,
        };
        ensure_index(archive, &options)?
    };

    let start = Instant::now();
    let tree = read_index(&index)?;
    info!(
        index = %index.display(),
        elapsed = %humantime::format_duration(start.elapsed()),
        "built tree: {}",
        tree.summary()
    );

    let json = render_json(&export(&tree, &config), args.pretty)?;
    debug!(bytes = json.len(), "export rendered");

    write_json(&json, args.output.as_deref())
}
