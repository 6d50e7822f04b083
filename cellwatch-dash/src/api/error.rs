use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cellwatch_core::StoreError;
use thiserror::Error;
use tracing::error;

use super::models::ApiResponse;
use crate::config::ConfigError;
use crate::cycle::CycleError;
use crate::inputs::InputError;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid cell: {0}")]
    InvalidCell(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No data for {0}")]
    NoData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(String),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::InvalidCell(_) | DashboardError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::NotFound(_) | DashboardError::NoData(_) => StatusCode::NOT_FOUND,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for DashboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidEntity(cell) => DashboardError::NotFound(cell.to_string()),
            other => DashboardError::Validation(other.to_string()),
        }
    }
}

impl From<InputError> for DashboardError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::UnknownCell(cell) => DashboardError::NotFound(cell.to_string()),
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Validation(err.to_string())
    }
}

impl From<CycleError> for DashboardError {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::Store(err) => err.into(),
            CycleError::Capture(err) => DashboardError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            DashboardError::NoData(_) => "no data".to_owned(),
            DashboardError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
