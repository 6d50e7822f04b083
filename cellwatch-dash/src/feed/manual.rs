use async_trait::async_trait;
use cellwatch_core::{CellId, Measurement};

use super::SweepSource;
use crate::state::DashboardState;

/// Reads the operator's input form.
pub struct ManualSource {
    state: DashboardState,
}

impl ManualSource {
    pub fn new(state: DashboardState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl SweepSource for ManualSource {
    type Error = std::convert::Infallible;

    fn name(&self) -> &'static str {
        "manual"
    }

    async fn capture(&self) -> Result<Vec<(CellId, Measurement)>, Self::Error> {
        Ok(self.state.input_sweep().await)
    }
}
