use std::path::PathBuf;
use std::sync::Arc;

use cellwatch_dash::{
    ApiState, Config, DashboardState, FeedConfig, ManualSource, MockSource, SweepSource, router,
    run_auto_refresh,
};
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "cellwatch-dash")]
#[command(about = "Battery cell monitoring dashboard")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "cellwatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,cellwatch_dash=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    info!(
        num_cells = config.dashboard.num_cells,
        voltage_threshold = config.dashboard.voltage_threshold,
        temp_threshold = config.dashboard.temp_threshold,
        auto_refresh = config.dashboard.auto_refresh,
        http_addr = %config.server.http_addr,
        "Starting cellwatch-dash"
    );

    let state = DashboardState::from_config(&config.dashboard)?;

    match config.feed {
        FeedConfig::Manual => {
            info!("Using manual input panel");
            let source = ManualSource::new(state.clone());
            run_dashboard(config, state, source).await?;
        }
        FeedConfig::Mock { seed } => {
            info!(?seed, "Using simulated sensor feed");
            let source = MockSource::new(config.dashboard.num_cells, seed);
            run_dashboard(config, state, source).await?;
        }
    }

    Ok(())
}

async fn run_dashboard<S: SweepSource>(
    config: Config,
    state: DashboardState,
    source: S,
) -> color_eyre::Result<()> {
    let cancel = CancellationToken::new();
    let source = Arc::new(source);

    let scheduler = tokio::spawn(run_auto_refresh(
        state.clone(),
        Arc::clone(&source),
        config.dashboard.refresh_interval(),
        cancel.clone(),
    ));

    let app = router(ApiState {
        dashboard: state,
        source,
    });

    let http_addr = config.server.http_addr;
    let listener = TcpListener::bind(http_addr).await?;
    info!(%http_addr, "HTTP server listening");

    let cancel_clone = cancel.clone();
    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        }) => {
            if let Err(e) = result {
                error!(error = ?e, "HTTP server error");
            }
            info!("HTTP server shut down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    cancel.cancel();
    let cycles = scheduler.await?;
    info!(cycles, "Dashboard stopped");

    Ok(())
}
