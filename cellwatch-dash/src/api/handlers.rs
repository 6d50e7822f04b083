use axum::{
    extract::{Json, Path, State},
    http::header,
    response::{Html, IntoResponse},
};
use cellwatch_core::{CellId, CellStatus, Reading};
use tracing::info;

use super::{
    ApiState,
    error::DashboardError,
    models::{ApiResponse, SettingsResponse},
};
use crate::cycle::{CycleReport, run_cycle};
use crate::feed::SweepSource;
use crate::inputs::{CellInput, CellInputEntry};
use crate::state::{DashboardState, SettingsUpdate};
use crate::view::{Overview, Trend};

type ApiResult<T> = Result<Json<ApiResponse<T>>, DashboardError>;

/// Parse a path segment such as `3` or `Cell 3` into a configured cell.
async fn configured_cell(state: &DashboardState, raw: &str) -> Result<CellId, DashboardError> {
    let cell: CellId = raw
        .parse()
        .map_err(|_| DashboardError::InvalidCell(raw.to_owned()))?;

    if !state.is_configured(&cell).await {
        return Err(DashboardError::NotFound(cell.to_string()));
    }
    Ok(cell)
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn dashboard_index() -> impl IntoResponse {
    Html(include_str!("templates/dashboard.html"))
}

/// GET /api/settings
pub async fn get_settings<S: SweepSource>(
    State(state): State<ApiState<S>>,
) -> ApiResult<SettingsResponse> {
    let num_cells = state.dashboard.cells().await.len();
    let settings = state.dashboard.settings().await;

    Ok(Json(ApiResponse::success(SettingsResponse::new(
        num_cells, settings,
    ))))
}

/// PUT /api/settings
pub async fn update_settings<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<SettingsResponse> {
    let settings = state.dashboard.update_settings(update).await?;
    let num_cells = state.dashboard.cells().await.len();

    info!(
        voltage_threshold = settings.thresholds.voltage,
        temp_threshold = settings.thresholds.temperature,
        auto_refresh = settings.auto_refresh,
        "Settings updated"
    );

    Ok(Json(ApiResponse::with_message(
        SettingsResponse::new(num_cells, settings),
        "Settings updated",
    )))
}

/// GET /api/cells
pub async fn list_cells<S: SweepSource>(State(state): State<ApiState<S>>) -> ApiResult<Vec<CellId>> {
    Ok(Json(ApiResponse::success(state.dashboard.cells().await)))
}

/// GET /api/inputs
pub async fn get_inputs<S: SweepSource>(
    State(state): State<ApiState<S>>,
) -> ApiResult<Vec<CellInputEntry>> {
    Ok(Json(ApiResponse::success(
        state.dashboard.input_entries().await,
    )))
}

/// POST /api/inputs
///
/// Replaces the form values and runs one refresh cycle with them.
pub async fn submit_inputs<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Json(entries): Json<Vec<CellInputEntry>>,
) -> ApiResult<CycleReport> {
    state.dashboard.submit_inputs(&entries).await?;
    let report = run_cycle(&state.dashboard, state.source.as_ref()).await?;

    Ok(Json(ApiResponse::with_message(report, "Data updated")))
}

/// PUT /api/inputs/{cell}
pub async fn update_input<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Path(cell): Path<String>,
    Json(input): Json<CellInput>,
) -> ApiResult<CellInputEntry> {
    let cell = configured_cell(&state.dashboard, &cell).await?;
    state.dashboard.set_input(cell, input).await?;

    Ok(Json(ApiResponse::success(CellInputEntry { cell, input })))
}

/// POST /api/refresh
pub async fn refresh<S: SweepSource>(State(state): State<ApiState<S>>) -> ApiResult<CycleReport> {
    let report = run_cycle(&state.dashboard, state.source.as_ref()).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// GET /api/overview
pub async fn overview<S: SweepSource>(State(state): State<ApiState<S>>) -> ApiResult<Overview> {
    let thresholds = state.dashboard.settings().await.thresholds;
    let snapshot = state.dashboard.snapshot().await;
    let last_update = state.dashboard.last_update().await;

    Ok(Json(ApiResponse::success(Overview::build(
        &snapshot,
        &thresholds,
        last_update,
    ))))
}

/// GET /api/cells/{cell}/series
pub async fn cell_series<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Path(cell): Path<String>,
) -> ApiResult<Vec<Reading>> {
    let cell = configured_cell(&state.dashboard, &cell).await?;
    Ok(Json(ApiResponse::success(
        state.dashboard.series(&cell).await,
    )))
}

/// GET /api/cells/{cell}/trend
pub async fn cell_trend<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Path(cell): Path<String>,
) -> ApiResult<Trend> {
    let cell = configured_cell(&state.dashboard, &cell).await?;
    let series = state.dashboard.series(&cell).await;

    Ok(Json(ApiResponse::success(Trend::from_series(cell, &series))))
}

/// GET /api/cells/{cell}/status
pub async fn cell_status<S: SweepSource>(
    State(state): State<ApiState<S>>,
    Path(cell): Path<String>,
) -> ApiResult<CellStatus> {
    let cell = configured_cell(&state.dashboard, &cell).await?;
    let status = state
        .dashboard
        .cell_status(&cell)
        .await
        .ok_or_else(|| DashboardError::NoData(cell.to_string()))?;

    Ok(Json(ApiResponse::success(status)))
}

/// GET /api/export.csv
pub async fn export_csv<S: SweepSource>(State(state): State<ApiState<S>>) -> impl IntoResponse {
    let csv = state.dashboard.export_csv().await;

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"battery_data.csv\"",
            ),
        ],
        csv,
    )
}
