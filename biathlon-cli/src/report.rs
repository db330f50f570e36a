//! Report generation
//!
//! Computes competitor reports and writes them as text lines or JSON.

use anyhow::Result;
use biathlon_race::{compute, format_duration, Competitors, LapStat, RaceConfig, Report};
use rayon::prelude::*;
use serde_json::{json, Value};
use std::io::Write;

/// Output format of the resulting table
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Compute the reports of all competitors, in competitor id order
pub fn compute_reports(competitors: &Competitors, config: &RaceConfig) -> Vec<Report> {
    competitors
        .par_iter()
        .map(|(_, competitor)| compute(competitor, config))
        .collect()
}

/// Write reports in the requested format
pub fn write_reports<W: Write + ?Sized>(
    out: &mut W,
    reports: &[Report],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, reports),
        OutputFormat::Json => write_json(out, reports),
    }
}

fn write_text<W: Write + ?Sized>(out: &mut W, reports: &[Report]) -> Result<()> {
    writeln!(out, "Resulting table")?;
    for report in reports {
        writeln!(out, "{}", report)?;
    }
    Ok(())
}

fn write_json<W: Write + ?Sized>(out: &mut W, reports: &[Report]) -> Result<()> {
    let values: Vec<Value> = reports.iter().map(report_to_json).collect();
    serde_json::to_writer_pretty(&mut *out, &values)?;
    writeln!(out)?;
    Ok(())
}

fn lap_to_json(lap: &LapStat) -> Value {
    json!({
        "duration": format_duration(lap.duration),
        "averageSpeed": lap.average_speed,
    })
}

fn report_to_json(report: &Report) -> Value {
    json!({
        "competitorId": report.competitor_id,
        "status": report.status.to_string(),
        "totalTime": format_duration(report.total_time),
        "laps": report.laps.iter().map(lap_to_json).collect::<Vec<_>>(),
        "penalty": lap_to_json(&report.penalty),
        "shots": report.shots,
        "possibleShots": report.possible_shots,
    })
}
