//! Chart-data export of decoded scripts.
//!
//! Only the fields a plotting tool consumes are written: midpoint time,
//! bandwidth, delay, loss and the phase bucket.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::ParsedRecord;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "time_s,bandwidth_mbps,delay_ms,loss_permille,phase,description";

#[derive(Serialize)]
struct ChartSeries<'a> {
    scenario: &'a str,
    records: &'a [ParsedRecord],
}

/// Write records as pretty JSON, tagged with the scenario name.
pub fn write_json<W: Write>(writer: W, scenario: &str, records: &[ParsedRecord]) -> Result<()> {
    serde_json::to_writer_pretty(writer, &ChartSeries { scenario, records })
        .map_err(|e| Error::Serialization(format!("Failed to write JSON: {e}")))
}

/// Write records as CSV, one row per record.
pub fn write_csv<W: Write>(mut writer: W, records: &[ParsedRecord]) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for rec in records {
        writeln!(
            writer,
            "{:.3},{},{},{},{},\"{}\"",
            rec.mid_time_s,
            rec.bandwidth,
            rec.delay,
            rec.loss,
            rec.phase_bucket,
            rec.description.replace('"', "\"\"")
        )?;
    }
    Ok(())
}

pub fn export_json<P: AsRef<Path>>(path: P, scenario: &str, records: &[ParsedRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, scenario, records)?;
    writer.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(path: P, records: &[ParsedRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}
