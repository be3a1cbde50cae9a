// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `tagreq` command-line front end.
//!
//! Loads a symbol manifest exported by the build, runs one validation round,
//! and prints the resulting diagnostics. Exit status is non-zero when the
//! round fails, so build scripts can gate on it.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tagreq_core::{Diagnostic, Processor, ProcessorOptions, RoundOutcome};
use tagreq_model::SymbolGraph;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tagreq",
    version,
    about = "Check annotation contracts over a symbol manifest",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a symbol manifest; exits 1 if any contract is violated.
    Check(CheckArgs),
    /// List the trigger tags the checker reacts to.
    Triggers(OptionArgs),
}

#[derive(Args)]
struct OptionArgs {
    /// JSON options file (`{"requires": {trigger: [tags]}, "ignore": [names]}`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host option as KEY=VALUE (repeatable), e.g. `requires_a.Trigger=a.Tag_b.Tag`.
    #[arg(short = 'A', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
}

#[derive(Args)]
struct CheckArgs {
    /// Symbol manifest (JSON) for this round.
    #[arg(long)]
    symbols: PathBuf,

    #[command(flatten)]
    options: OptionArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    outcome: RoundOutcome,
    diagnostics: &'a [Diagnostic],
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Triggers(args) => run_triggers(&args),
    }
}

fn load_options(args: &OptionArgs) -> Result<ProcessorOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let file = open(path)?;
            ProcessorOptions::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse options file {}", path.display()))?
        }
        None => ProcessorOptions::default(),
    };
    options.merge(ProcessorOptions::from_args(&args.options)?);
    debug!(triggers = options.requires.len(), ignore = options.ignore.len(), "options loaded");
    Ok(options)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn run_check(args: &CheckArgs) -> Result<ExitCode> {
    let processor = Processor::new(load_options(&args.options)?);
    let graph = SymbolGraph::from_reader(BufReader::new(open(&args.symbols)?))
        .with_context(|| format!("failed to load symbol manifest {}", args.symbols.display()))?;
    debug!(symbols = graph.len(), "manifest loaded");

    let report = processor.run(&graph);

    let mut out = io::stdout().lock();
    match args.format {
        Format::Text => {
            for diagnostic in &report.diagnostics {
                writeln!(out, "error: {}", diagnostic.message)?;
            }
        }
        Format::Json => {
            let json = JsonReport {
                outcome: report.outcome,
                diagnostics: &report.diagnostics,
            };
            serde_json::to_writer_pretty(&mut out, &json)?;
            writeln!(out)?;
        }
    }

    Ok(if report.outcome.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_triggers(args: &OptionArgs) -> Result<ExitCode> {
    let processor = Processor::new(load_options(args)?);
    let mut out = io::stdout().lock();
    for trigger in processor.supported_triggers() {
        writeln!(out, "{trigger}")?;
    }
    Ok(ExitCode::SUCCESS)
}
