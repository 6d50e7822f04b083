pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

pub use error::DashboardError;
pub use models::{ApiResponse, SettingsResponse};

use crate::feed::SweepSource;
use crate::state::DashboardState;

/// State shared by every API handler.
pub struct ApiState<S> {
    pub dashboard: DashboardState,
    /// Source used for refresh cycles triggered over HTTP.
    pub source: Arc<S>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            dashboard: self.dashboard.clone(),
            source: Arc::clone(&self.source),
        }
    }
}

pub fn router<S: SweepSource>(state: ApiState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_index))
        .route("/health", get(handlers::health))
        .route(
            "/api/settings",
            get(handlers::get_settings::<S>).put(handlers::update_settings::<S>),
        )
        .route("/api/cells", get(handlers::list_cells::<S>))
        .route(
            "/api/inputs",
            get(handlers::get_inputs::<S>).post(handlers::submit_inputs::<S>),
        )
        .route("/api/inputs/{cell}", put(handlers::update_input::<S>))
        .route("/api/refresh", post(handlers::refresh::<S>))
        .route("/api/overview", get(handlers::overview::<S>))
        .route("/api/cells/{cell}/series", get(handlers::cell_series::<S>))
        .route("/api/cells/{cell}/trend", get(handlers::cell_trend::<S>))
        .route("/api/cells/{cell}/status", get(handlers::cell_status::<S>))
        .route("/api/export.csv", get(handlers::export_csv::<S>))
        .with_state(state)
}
