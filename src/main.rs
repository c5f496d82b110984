use log::{error, info};
use service::{config::Config, logging::Logger};
use sse::{Manager, SseDomainEventHandler};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting Townhall API...");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let sse_manager = Arc::new(Manager::new());
    let event_publisher = events::EventPublisher::new()
        .with_handler(Arc::new(SseDomainEventHandler::new(sse_manager.clone())));

    let heartbeat_interval = Duration::from_secs(config.heartbeat_interval_secs);
    sse_manager.spawn_heartbeat(heartbeat_interval);
    info!("SSE heartbeat every {heartbeat_interval:?}");

    let app_state = service::AppState::new(config, &db, sse_manager, event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
