use std::sync::Arc;

use cellwatch_core::{
    AlertThresholds, CellId, CellReading, CellStatus, FleetHealth, Measurement, Reading,
    StoreError, TelemetryStore,
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::{ConfigError, DashboardConfig, validate_thresholds};
use crate::inputs::{CellInput, CellInputEntry, InputError, InputPanel};

/// Operator settings that can change while the dashboard runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub thresholds: AlertThresholds,
    pub auto_refresh: bool,
}

/// Partial settings change. Absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SettingsUpdate {
    pub voltage_threshold: Option<f64>,
    pub temp_threshold: Option<f64>,
    pub auto_refresh: Option<bool>,
}

/// Result of ingesting one sweep, computed under the same write lock.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub tick_at: Timestamp,
    pub cells_ingested: usize,
    pub health: FleetHealth,
}

/// Shared state for the store, the input form and operator settings.
///
/// The store's write lock is the single serialization point for ingest;
/// readers copy data out and release the lock straight away.
pub struct DashboardState {
    inner: Arc<Inner>,
}

struct Inner {
    store: RwLock<TelemetryStore>,
    inputs: RwLock<InputPanel>,
    settings: RwLock<Settings>,
}

impl DashboardState {
    pub fn new(store: TelemetryStore, settings: Settings) -> Self {
        let inputs = InputPanel::new(store.cell_count());

        Self {
            inner: Arc::new(Inner {
                store: RwLock::new(store),
                inputs: RwLock::new(inputs),
                settings: RwLock::new(settings),
            }),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, StoreError> {
        let store = TelemetryStore::new(config.num_cells)?;
        let settings = Settings {
            thresholds: config.thresholds(),
            auto_refresh: config.auto_refresh,
        };
        Ok(Self::new(store, settings))
    }

    pub async fn cells(&self) -> Vec<CellId> {
        self.inner.store.read().await.cells()
    }

    pub async fn is_configured(&self, cell: &CellId) -> bool {
        self.inner.store.read().await.contains(cell)
    }

    pub async fn settings(&self) -> Settings {
        *self.inner.settings.read().await
    }

    /// Apply a settings change after validating the resulting thresholds.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, ConfigError> {
        let mut settings = self.inner.settings.write().await;

        let mut next = *settings;
        if let Some(voltage) = update.voltage_threshold {
            next.thresholds.voltage = voltage;
        }
        if let Some(temperature) = update.temp_threshold {
            next.thresholds.temperature = temperature;
        }
        if let Some(auto_refresh) = update.auto_refresh {
            next.auto_refresh = auto_refresh;
        }
        validate_thresholds(&next.thresholds)?;

        *settings = next;
        Ok(next)
    }

    pub async fn input_entries(&self) -> Vec<CellInputEntry> {
        self.inner.inputs.read().await.entries()
    }

    pub async fn set_input(&self, cell: CellId, input: CellInput) -> Result<(), InputError> {
        self.inner.inputs.write().await.set(cell, input)
    }

    pub async fn submit_inputs(&self, entries: &[CellInputEntry]) -> Result<(), InputError> {
        self.inner.inputs.write().await.submit(entries)
    }

    /// Current form values as one sweep over every configured cell.
    pub async fn input_sweep(&self) -> Vec<(CellId, Measurement)> {
        self.inner.inputs.read().await.sweep()
    }

    /// Ingest one sweep and summarise the fleet as it stands right after it.
    ///
    /// The sweep is stamped once the write lock is held, so concurrent
    /// cycles are stamped in the order they are stored.
    pub async fn ingest_sweep(
        &self,
        sweep: Vec<(CellId, Measurement)>,
    ) -> Result<SweepOutcome, StoreError> {
        let thresholds = self.settings().await.thresholds;
        let mut store = self.inner.store.write().await;

        let now = Timestamp::now();
        let cells_ingested = store.ingest_batch_at(sweep, now)?;
        let tick_at = store.last_ingest_at().unwrap_or(now);
        let health = FleetHealth::from_snapshot(&store.latest_snapshot(), &thresholds);

        Ok(SweepOutcome {
            tick_at,
            cells_ingested,
            health,
        })
    }

    pub async fn snapshot(&self) -> Vec<CellReading> {
        self.inner.store.read().await.latest_snapshot()
    }

    pub async fn series(&self, cell: &CellId) -> Vec<Reading> {
        self.inner.store.read().await.series(cell)
    }

    pub async fn average_capacity(&self) -> Option<f64> {
        self.inner.store.read().await.average_capacity()
    }

    pub async fn last_update(&self) -> Option<Timestamp> {
        self.inner.store.read().await.last_ingest_at()
    }

    /// Status of `cell` at the latest sweep, `None` if it has no reading in
    /// that sweep.
    pub async fn cell_status(&self, cell: &CellId) -> Option<CellStatus> {
        let thresholds = self.settings().await.thresholds;
        let reading = self.inner.store.read().await.latest(cell)?;
        Some(CellStatus::derive(*cell, &reading, &thresholds))
    }

    pub async fn export_csv(&self) -> String {
        self.inner.store.read().await.export_csv()
    }
}

impl Clone for DashboardState {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwatch_core::Mode;

    fn state(cells: usize) -> DashboardState {
        DashboardState::new(
            TelemetryStore::new(cells).unwrap(),
            Settings {
                thresholds: AlertThresholds::default(),
                auto_refresh: false,
            },
        )
    }

    #[tokio::test]
    async fn input_panel_matches_store_cells() {
        let state = state(5);

        assert_eq!(state.cells().await.len(), 5);
        assert_eq!(state.input_entries().await.len(), 5);
        assert_eq!(state.input_sweep().await.len(), 5);
    }

    #[tokio::test]
    async fn ingest_sweep_reports_health_of_that_sweep() {
        let state = state(2);
        let sweep = vec![
            (
                CellId(1),
                Measurement {
                    voltage: 3.7,
                    current: 1.0,
                    temperature: 25.0,
                    capacity: 90.0,
                    mode: Mode::Charging,
                },
            ),
            (
                CellId(2),
                Measurement {
                    voltage: 3.4,
                    current: -0.5,
                    temperature: 28.0,
                    capacity: 85.0,
                    mode: Mode::Discharging,
                },
            ),
        ];

        let outcome = state.ingest_sweep(sweep).await.unwrap();

        assert_eq!(outcome.cells_ingested, 2);
        assert_eq!(outcome.health.average_capacity, Some(87.5));
        assert_eq!(outcome.health.alerting, vec![CellId(1)]);
        assert_eq!(state.average_capacity().await, Some(87.5));
        assert!(state.cell_status(&CellId(1)).await.unwrap().alert.voltage_high);
        assert!(state.cell_status(&CellId(3)).await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sweeps_never_stamp_behind_stored_readings() {
        let state = state(2);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move {
                    let sweep = state.input_sweep().await;
                    state.ingest_sweep(sweep).await.unwrap().tick_at
                })
            })
            .collect();
        let mut ticks = Vec::new();
        for task in tasks {
            ticks.push(task.await.unwrap());
        }

        let last_update = state.last_update().await.unwrap();
        assert_eq!(Some(last_update), ticks.iter().copied().max());
        for cell in state.cells().await {
            let series = state.series(&cell).await;
            assert_eq!(series.len(), 16);
            assert!(series.iter().all(|reading| reading.timestamp <= last_update));
        }
    }

    #[tokio::test]
    async fn settings_update_is_validated() {
        let state = state(1);

        let updated = state
            .update_settings(SettingsUpdate {
                temp_threshold: Some(45.0),
                auto_refresh: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.thresholds.temperature, 45.0);
        assert_eq!(updated.thresholds.voltage, 3.5);
        assert!(updated.auto_refresh);

        let err = state
            .update_settings(SettingsUpdate {
                voltage_threshold: Some(9.0),
                auto_refresh: Some(false),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::VoltageThreshold(_)));
        assert!(state.settings().await.auto_refresh);
    }
}
