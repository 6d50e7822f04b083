//! Presentation-facing classification derived from readings.
//!
//! Everything here is a pure function of a reading (or a snapshot) and the
//! operator's alert thresholds.

use serde::{Deserialize, Serialize};

use crate::{CellId, CellReading, Mode, Reading};

/// Trend indicator shown next to a cell. Determined by mode alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusIndicator {
    Rising,
    Falling,
    Paused,
}

impl StatusIndicator {
    pub fn glyph(self) -> &'static str {
        match self {
            StatusIndicator::Rising => "🔺",
            StatusIndicator::Falling => "🔻",
            StatusIndicator::Paused => "⏸️",
        }
    }

    /// Foreground colour for the status label.
    pub fn color(self) -> &'static str {
        match self {
            StatusIndicator::Rising => "#28a745",
            StatusIndicator::Falling => "#dc3545",
            StatusIndicator::Paused => "#000000",
        }
    }
}

impl From<Mode> for StatusIndicator {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Charging => StatusIndicator::Rising,
            Mode::Discharging => StatusIndicator::Falling,
            Mode::Idle => StatusIndicator::Paused,
        }
    }
}

/// Operator-configured alert limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Volts. Readings strictly above this raise a voltage alert.
    pub voltage: f64,
    /// Degrees Celsius. Readings strictly above this raise a temperature alert.
    pub temperature: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            voltage: 3.5,
            temperature: 60.0,
        }
    }
}

impl AlertThresholds {
    pub fn evaluate(&self, reading: &Reading) -> Alert {
        Alert {
            voltage_high: reading.voltage > self.voltage,
            temperature_high: reading.temperature > self.temperature,
        }
    }
}

/// Which thresholds a reading exceeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub voltage_high: bool,
    pub temperature_high: bool,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.voltage_high || self.temperature_high
    }
}

/// Derived status of one cell at its latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellStatus {
    pub cell: CellId,
    pub mode: Mode,
    pub indicator: StatusIndicator,
    pub alert: Alert,
}

impl CellStatus {
    pub fn derive(cell: CellId, reading: &Reading, thresholds: &AlertThresholds) -> Self {
        Self {
            cell,
            mode: reading.mode,
            indicator: StatusIndicator::from(reading.mode),
            alert: thresholds.evaluate(reading),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCounts {
    pub idle: usize,
    pub charging: usize,
    pub discharging: usize,
}

impl ModeCounts {
    fn record(&mut self, mode: Mode) {
        match mode {
            Mode::Idle => self.idle += 1,
            Mode::Charging => self.charging += 1,
            Mode::Discharging => self.discharging += 1,
        }
    }
}

/// Aggregate health of the fleet at the latest sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetHealth {
    pub cells_reporting: usize,
    /// Mean capacity over the reporting cells, `None` when nothing reported.
    pub average_capacity: Option<f64>,
    pub alerting: Vec<CellId>,
    pub modes: ModeCounts,
}

impl FleetHealth {
    pub fn from_snapshot(snapshot: &[CellReading], thresholds: &AlertThresholds) -> Self {
        let mut modes = ModeCounts::default();
        let mut alerting = Vec::new();
        let mut capacity_total = 0.0;

        for entry in snapshot {
            modes.record(entry.reading.mode);
            capacity_total += entry.reading.capacity;
            if thresholds.evaluate(&entry.reading).is_active() {
                alerting.push(entry.cell);
            }
        }

        let average_capacity = if snapshot.is_empty() {
            None
        } else {
            Some(capacity_total / snapshot.len() as f64)
        };

        Self {
            cells_reporting: snapshot.len(),
            average_capacity,
            alerting,
            modes,
        }
    }
}
