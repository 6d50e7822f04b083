use thiserror::Error;

use crate::CellId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} is not a configured cell")]
    InvalidEntity(CellId),

    #[error("{0} appears more than once in the same sweep")]
    DuplicateEntity(CellId),

    #[error("cell count must be between 1 and {max}, got {count}")]
    InvalidCellCount { count: usize, max: usize },

    #[error("retention limit must be at least one reading")]
    InvalidRetention,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cell id: {0:?}")]
pub struct ParseCellIdError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mode: {0:?} (expected Idle, Charging or Discharging)")]
pub struct ParseModeError(pub String);
