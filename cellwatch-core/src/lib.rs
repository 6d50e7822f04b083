pub mod error;
pub mod export;
pub mod status;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::{ParseCellIdError, ParseModeError, StoreError};
pub use export::{CSV_HEADER, ExportRow};
pub use status::{Alert, AlertThresholds, CellStatus, FleetHealth, ModeCounts, StatusIndicator};
pub use store::{MAX_CELLS, RETENTION_LIMIT, TelemetryStore};

/// Identity of a monitored battery cell.
///
/// Cells are numbered from 1 and displayed as `Cell N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId(pub u8);

impl CellId {
    /// Cells `Cell 1..=Cell count`, in order.
    pub fn range(count: u8) -> impl Iterator<Item = CellId> {
        (1..=count).map(CellId)
    }

    /// Zero-based position of this cell in a configured fleet.
    pub fn index(self) -> usize {
        usize::from(self.0).saturating_sub(1)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell {}", self.0)
    }
}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    /// Accepts `Cell 3` as well as a bare `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_prefix("Cell")
            .map(str::trim_start)
            .unwrap_or(trimmed);

        match number.parse::<u8>() {
            Ok(n) if n > 0 => Ok(CellId(n)),
            _ => Err(ParseCellIdError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for CellId {
    type Error = ParseCellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.to_string()
    }
}

/// Operating mode reported for a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Idle,
    Charging,
    Discharging,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Idle, Mode::Charging, Mode::Discharging];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Charging => "Charging",
            Mode::Discharging => "Discharging",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

/// Values captured for one cell during one sweep, before they are stamped.
///
/// None of the physical values are range checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Terminal voltage in volts.
    pub voltage: f64,
    /// Current in amps. The sign is not cross-checked against `mode`.
    pub current: f64,
    /// Cell temperature in degrees Celsius.
    pub temperature: f64,
    /// State of charge in percent.
    pub capacity: f64,
    /// Operating mode at capture time.
    pub mode: Mode,
}

impl Measurement {
    /// Stamp this measurement, producing an immutable reading.
    pub fn at(self, timestamp: jiff::Timestamp) -> Reading {
        Reading {
            timestamp,
            voltage: self.voltage,
            current: self.current,
            temperature: self.temperature,
            capacity: self.capacity,
            mode: self.mode,
        }
    }
}

/// A single timestamped sample for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Instant the sweep was ingested.
    pub timestamp: jiff::Timestamp,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub mode: Mode,
}

impl Reading {
    pub fn measurement(&self) -> Measurement {
        Measurement {
            voltage: self.voltage,
            current: self.current,
            temperature: self.temperature,
            capacity: self.capacity,
            mode: self.mode,
        }
    }
}

/// A reading together with the cell it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellReading {
    pub cell: CellId,
    pub reading: Reading,
}
