//! Biathlon Race CLI Application
//!
//! This is the command-line interface for the biathlon race processor.
//! It uses the biathlon-race library and adds:
//! - Configuration file loading (JSON/TOML)
//! - The output log (one line per incoming event)
//! - The resulting table (text or JSON)

use anyhow::{Context, Result};
use biathlon_race::{EventLogParser, EventProcessor};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod report;

use report::OutputFormat;

/// Biathlon Race - Replay race events and report competitor results
#[derive(Parser, Debug)]
#[command(name = "biathlon-cli")]
#[command(about = "Replay biathlon race events and report competitor results", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the race configuration (JSON or TOML)
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Path to the race event log
    #[arg(short, long, value_name = "FILE", default_value = "events")]
    events: PathBuf,

    /// Output file for the event log and results (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Format of the resulting table
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Do not write the per-event output log
    #[arg(long)]
    no_event_log: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Biathlon Race CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using race library v{}", biathlon_race::VERSION);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    run(&args, &mut out)?;
    out.flush().context("Failed to flush output")?;

    Ok(())
}

/// Load the configuration, replay the events and write the results
fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    log::info!("Loading configuration from: {:?}", args.config);
    let race = config::load_config(&args.config)?;
    log::debug!(
        "Race: {} laps of {}m, penalty loop {}m, {} firing line(s), start {} every {}s",
        race.laps,
        race.lap_len,
        race.penalty_len,
        race.firing_lines,
        race.start,
        race.start_delta.num_seconds()
    );

    let events = EventLogParser::parse(&args.events)
        .with_context(|| format!("Failed to open event log: {:?}", args.events))?;

    let mut processor = EventProcessor::new(race.laps);
    if !args.no_event_log && args.format == OutputFormat::Text {
        writeln!(out, "Output log")?;
    }
    for event in events {
        let event = event.context("Failed to read event log")?;
        if !args.no_event_log && args.format == OutputFormat::Text {
            writeln!(out, "{}", event)?;
        }
        processor
            .apply(&event)
            .with_context(|| format!("Failed to process event: {}", event))?;
    }

    let competitors = processor.into_competitors();
    log::info!("Event log replayed for {} competitors", competitors.len());

    let reports = report::compute_reports(&competitors, &race);
    report::write_reports(out, &reports, args.format)?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
