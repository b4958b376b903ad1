use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_server::config::ServerConfig;
use transit_server::schedule::ScheduleHandle;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;

    // Build the first generation before accepting connections
    info!(path = %config.feed_path.display(), "Loading schedule");
    let feed_path = config.feed_path.clone();
    let schedule =
        tokio::task::spawn_blocking(move || ScheduleHandle::load(feed_path)).await??;
    let store = schedule.current();
    info!(
        generation = store.generation(),
        stops = store.stop_count(),
        patterns = store.pattern_count(),
        "Schedule ready"
    );
    drop(store);

    let state = AppState::new(schedule, config.search, config.feed_path);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Transit journey planner listening");
    info!("  GET  /health        - Health check");
    info!("  GET  /status        - Served schedule generation");
    info!("  GET  /stops/:id     - Stop with parent station and children");
    info!("  GET  /journey/plan  - Plan a journey (?from=&to=&date=&time=)");
    info!("  POST /admin/reload  - Reload the schedule feed");

    axum::serve(listener, app).await?;
    Ok(())
}
