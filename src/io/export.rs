//! CSV export of simulation traces.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::SimError;
use crate::sim::orchestrator::ComparisonOutcome;
use crate::sim::types::StepRecord;

/// Schema v1 column header for trace export.
const HEADER: &str = "policy,time,price,solar_kwh,wind_kwh,consumption_kwh,\
                      battery_before_kwh,battery_after_kwh,balance,actions";

/// Exports both traces of a comparison to a single CSV file.
///
/// Writes a header row, then one row per basic step followed by one row
/// per smart step. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// I/O and CSV errors from file creation or writing.
pub fn export_comparison_csv(outcome: &ComparisonOutcome, path: &Path) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_comparison_csv(outcome, io::BufWriter::new(file))
}

/// Writes both traces as CSV to any writer.
///
/// # Errors
///
/// CSV errors if writing fails.
pub fn write_comparison_csv(
    outcome: &ComparisonOutcome,
    writer: impl Write,
) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;
    for record in &outcome.basic_trace {
        write_row(&mut wtr, "basic", record)?;
    }
    for record in &outcome.smart_trace {
        write_row(&mut wtr, "smart", record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_row<W: Write>(
    wtr: &mut csv::Writer<W>,
    policy: &str,
    r: &StepRecord,
) -> Result<(), SimError> {
    wtr.write_record(&[
        policy.to_string(),
        r.clock.to_string(),
        format!("{:.4}", r.price),
        format!("{:.4}", r.solar_kwh),
        format!("{:.4}", r.wind_kwh),
        format!("{:.4}", r.consumption_kwh),
        format!("{:.4}", r.battery_before),
        format!("{:.4}", r.battery_after),
        format!("{:.4}", r.balance_after),
        format_actions(r),
    ])?;
    Ok(())
}

/// Flattens an action list into `flow:kwh` pairs separated by `"; "`.
fn format_actions(record: &StepRecord) -> String {
    if record.actions.is_empty() {
        return "none".to_string();
    }
    record
        .actions
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
