use cellwatch_core::AlertThresholds;
use serde::Serialize;

use crate::state::Settings;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            success: true,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Some(message.into()),
            success: true,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            data: None,
            message: Some(message),
            success: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub num_cells: usize,
    pub voltage_threshold: f64,
    pub temp_threshold: f64,
    pub auto_refresh: bool,
}

impl SettingsResponse {
    pub fn new(num_cells: usize, settings: Settings) -> Self {
        let AlertThresholds {
            voltage,
            temperature,
        } = settings.thresholds;

        Self {
            num_cells,
            voltage_threshold: voltage,
            temp_threshold: temperature,
            auto_refresh: settings.auto_refresh,
        }
    }
}

