pub mod manual;
pub mod mock;

use async_trait::async_trait;
use cellwatch_core::{CellId, Measurement};

pub use manual::ManualSource;
pub use mock::{MockFeedError, MockSource};

/// Something that can capture one sweep of readings across the fleet.
///
/// A refresh cycle calls [`capture`](SweepSource::capture) once and ingests
/// the result as a single batch.
#[async_trait]
pub trait SweepSource: Send + Sync + 'static {
    /// Error type for this source implementation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Capture one measurement per cell.
    async fn capture(&self) -> Result<Vec<(CellId, Measurement)>, Self::Error>;
}
