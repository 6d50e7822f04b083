use std::sync::Arc;
use std::time::Duration;

use cellwatch_core::{CellId, StoreError};
use jiff::Timestamp;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::feed::SweepSource;
use crate::state::DashboardState;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("sweep capture failed: {0}")]
    Capture(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one capture-ingest pass did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub tick_at: Timestamp,
    pub cells_ingested: usize,
    pub average_capacity: Option<f64>,
    pub alerting: Vec<CellId>,
}

/// Capture one sweep from `source` and ingest it as a single batch.
///
/// The returned report is computed under the same store lock as the ingest,
/// so it always describes this cycle's sweep.
#[instrument(skip_all, fields(source = source.name()))]
pub async fn run_cycle<S: SweepSource>(
    state: &DashboardState,
    source: &S,
) -> Result<CycleReport, CycleError> {
    let sweep = source
        .capture()
        .await
        .map_err(|e| CycleError::Capture(Box::new(e)))?;

    let outcome = state.ingest_sweep(sweep).await?;

    debug!(
        cells = outcome.cells_ingested,
        average_capacity = ?outcome.health.average_capacity,
        alerting = outcome.health.alerting.len(),
        "Refresh cycle complete"
    );

    Ok(CycleReport {
        tick_at: outcome.tick_at,
        cells_ingested: outcome.cells_ingested,
        average_capacity: outcome.health.average_capacity,
        alerting: outcome.health.alerting,
    })
}

/// Periodically run refresh cycles while auto refresh is enabled.
///
/// The timer keeps ticking when auto refresh is off so that switching it on
/// takes effect at the next tick. Returns the number of cycles run once
/// `cancel` fires.
pub async fn run_auto_refresh<S: SweepSource>(
    state: DashboardState,
    source: Arc<S>,
    period: Duration,
    cancel: CancellationToken,
) -> u64 {
    info!(
        period_secs = period.as_secs_f64(),
        source = source.name(),
        "Auto refresh scheduler started"
    );

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycles = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(cycles, "Auto refresh scheduler shutting down");
                break;
            }
            _ = interval.tick() => {
                if !state.settings().await.auto_refresh {
                    continue;
                }

                match run_cycle(&state, source.as_ref()).await {
                    Ok(report) => {
                        cycles += 1;
                        if !report.alerting.is_empty() {
                            info!(alerting = ?report.alerting, "Cells above alert thresholds");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Refresh cycle failed");
                    }
                }
            }
        }
    }

    cycles
}
