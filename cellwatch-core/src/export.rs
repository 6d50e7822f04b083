//! Flattened tabular export of a store's retained history.

use std::fmt::Write;

use serde::Serialize;

use crate::{CellId, Mode, Reading};

pub const CSV_HEADER: &str = "timestamp,entity,voltage,current,temperature,capacity,mode";

/// One exported reading, tagged with its cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportRow {
    pub timestamp: jiff::Timestamp,
    pub entity: CellId,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub mode: Mode,
}

impl ExportRow {
    pub fn new(entity: CellId, reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            entity,
            voltage: reading.voltage,
            current: reading.current,
            temperature: reading.temperature,
            capacity: reading.capacity,
            mode: reading.mode,
        }
    }

    fn write_csv_line(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            self.timestamp,
            self.entity,
            self.voltage,
            self.current,
            self.temperature,
            self.capacity,
            self.mode,
        );
    }
}

/// Render rows as CSV. None of the fields can contain a comma or quote, so
/// no escaping is needed.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows.len() * 72);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in rows {
        row.write_csv_line(&mut out);
    }

    out
}
