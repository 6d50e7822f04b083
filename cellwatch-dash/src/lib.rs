pub mod api;
pub mod config;
pub mod cycle;
pub mod feed;
pub mod inputs;
pub mod state;
pub mod view;

pub use api::{ApiState, DashboardError, router};
pub use config::{Config, ConfigError, DashboardConfig, FeedConfig, ServerConfig};
pub use cycle::{CycleError, CycleReport, run_auto_refresh, run_cycle};
pub use feed::{ManualSource, MockSource, SweepSource};
pub use inputs::{CellInput, CellInputEntry, InputError, InputPanel};
pub use state::{DashboardState, Settings, SettingsUpdate};
pub use view::{CellCard, Overview, Trend};
