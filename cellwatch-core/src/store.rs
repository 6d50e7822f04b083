use std::collections::{BTreeMap, BTreeSet, VecDeque};

use jiff::Timestamp;

use crate::export::{self, ExportRow};
use crate::{CellId, CellReading, Measurement, Reading, StoreError};

/// Maximum number of readings kept per cell.
pub const RETENTION_LIMIT: usize = 100;

/// Largest fleet a store can be configured with.
pub const MAX_CELLS: usize = 20;

/// Bounded history for a single cell.
#[derive(Debug, Clone, Default)]
struct Series {
    readings: VecDeque<Reading>,
    /// Ingest tick that last appended to this series. Zero means never.
    last_tick: u64,
}

impl Series {
    fn push(&mut self, measurement: Measurement, at: Timestamp, tick: u64, retention: usize) {
        // Keep timestamps non-decreasing even if the wall clock steps back.
        let at = match self.readings.back() {
            Some(last) if last.timestamp > at => last.timestamp,
            _ => at,
        };

        self.readings.push_back(measurement.at(at));
        while self.readings.len() > retention {
            self.readings.pop_front();
        }
        self.last_tick = tick;
    }
}

/// In-memory, per-cell rolling history of readings.
///
/// The set of cells is fixed at construction. Every configured cell owns
/// exactly one series, capped at the retention limit with oldest-first
/// eviction. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    series: BTreeMap<CellId, Series>,
    retention: usize,
    /// Incremented by every ingest call that appends at least one reading.
    tick: u64,
    last_ingest_at: Option<Timestamp>,
}

impl TelemetryStore {
    /// Configure a store for `Cell 1..=Cell cell_count` with the default
    /// retention limit.
    pub fn new(cell_count: usize) -> Result<Self, StoreError> {
        Self::with_retention(cell_count, RETENTION_LIMIT)
    }

    pub fn with_retention(cell_count: usize, retention: usize) -> Result<Self, StoreError> {
        if !(1..=MAX_CELLS).contains(&cell_count) {
            return Err(StoreError::InvalidCellCount {
                count: cell_count,
                max: MAX_CELLS,
            });
        }
        if retention == 0 {
            return Err(StoreError::InvalidRetention);
        }

        // MAX_CELLS fits in a u8, checked above.
        let series = CellId::range(cell_count as u8)
            .map(|id| (id, Series::default()))
            .collect();

        Ok(Self {
            series,
            retention,
            tick: 0,
            last_ingest_at: None,
        })
    }

    /// Configured cells in ascending order.
    pub fn cells(&self) -> Vec<CellId> {
        self.series.keys().copied().collect()
    }

    pub fn cell_count(&self) -> usize {
        self.series.len()
    }

    pub fn contains(&self, cell: &CellId) -> bool {
        self.series.contains_key(cell)
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Total number of retained readings across all cells.
    pub fn len(&self) -> usize {
        self.series.values().map(|s| s.readings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of the most recent successful ingest, never earlier than a
    /// stored reading.
    pub fn last_ingest_at(&self) -> Option<Timestamp> {
        self.last_ingest_at
    }

    /// Append one reading for `cell`, stamped now.
    pub fn ingest(&mut self, cell: CellId, measurement: Measurement) -> Result<(), StoreError> {
        self.ingest_at(cell, measurement, Timestamp::now())
    }

    /// Append one reading for `cell` with an explicit timestamp.
    ///
    /// A single ingest counts as a sweep of one cell for
    /// [`latest_snapshot`](Self::latest_snapshot).
    pub fn ingest_at(
        &mut self,
        cell: CellId,
        measurement: Measurement,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.ingest_batch_at([(cell, measurement)], at).map(|_| ())
    }

    /// Ingest one sweep, stamping every entry with the same instant (now).
    pub fn ingest_batch<I>(&mut self, batch: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = (CellId, Measurement)>,
    {
        self.ingest_batch_at(batch, Timestamp::now())
    }

    /// Ingest one sweep stamped with `at`, returning how many readings were
    /// appended.
    ///
    /// The batch is all-or-nothing: if any entry names an unconfigured cell,
    /// or names a cell a second time, nothing is stored. An empty batch is a no-op and leaves the latest
    /// snapshot untouched.
    pub fn ingest_batch_at<I>(&mut self, batch: I, at: Timestamp) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = (CellId, Measurement)>,
    {
        let batch: Vec<(CellId, Measurement)> = batch.into_iter().collect();

        let mut seen = BTreeSet::new();
        for (cell, _) in &batch {
            if !self.contains(cell) {
                return Err(StoreError::InvalidEntity(*cell));
            }
            if !seen.insert(*cell) {
                return Err(StoreError::DuplicateEntity(*cell));
            }
        }
        if batch.is_empty() {
            return Ok(0);
        }

        self.tick += 1;
        let tick = self.tick;
        let retention = self.retention;

        for (cell, measurement) in &batch {
            if let Some(series) = self.series.get_mut(cell) {
                series.push(*measurement, at, tick, retention);
            }
        }
        self.last_ingest_at = Some(self.last_ingest_at.map_or(at, |last| last.max(at)));

        Ok(batch.len())
    }

    /// The readings produced by the most recent ingest call, one per cell
    /// that took part in it, in cell order.
    ///
    /// Cells without history never appear, and readings from earlier sweeps
    /// are never mixed in.
    pub fn latest_snapshot(&self) -> Vec<CellReading> {
        if self.tick == 0 {
            return Vec::new();
        }

        self.series
            .iter()
            .filter(|(_, series)| series.last_tick == self.tick)
            .filter_map(|(cell, series)| {
                series.readings.back().map(|reading| CellReading {
                    cell: *cell,
                    reading: *reading,
                })
            })
            .collect()
    }

    /// Latest reading for a single cell, if it took part in the latest sweep.
    pub fn latest(&self, cell: &CellId) -> Option<Reading> {
        let series = self.series.get(cell)?;
        if self.tick == 0 || series.last_tick != self.tick {
            return None;
        }
        series.readings.back().copied()
    }

    /// Retained readings for `cell`, oldest first. Empty if the cell has no
    /// history or is not configured.
    pub fn series(&self, cell: &CellId) -> Vec<Reading> {
        self.series
            .get(cell)
            .map(|series| series.readings.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of readings retained for `cell`.
    pub fn series_len(&self, cell: &CellId) -> usize {
        self.series.get(cell).map_or(0, |s| s.readings.len())
    }

    /// Mean capacity over the latest snapshot, `None` before the first sweep.
    pub fn average_capacity(&self) -> Option<f64> {
        let snapshot = self.latest_snapshot();
        if snapshot.is_empty() {
            return None;
        }

        let total: f64 = snapshot.iter().map(|entry| entry.reading.capacity).sum();
        Some(total / snapshot.len() as f64)
    }

    /// Every retained reading flattened into rows, ordered by cell and then
    /// by timestamp.
    pub fn export(&self) -> Vec<ExportRow> {
        self.series
            .iter()
            .flat_map(|(cell, series)| {
                series
                    .readings
                    .iter()
                    .map(move |reading| ExportRow::new(*cell, reading))
            })
            .collect()
    }

    /// [`export`](Self::export) rendered as CSV with a header row.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.export())
    }
}
