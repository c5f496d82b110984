pub(crate) mod controller;
pub(crate) mod error;
pub(crate) mod extractors;
pub(crate) mod middleware;
pub(crate) mod params;
pub mod router;
pub(crate) mod sse;

pub use error::{Error, Result};
pub use router::define_routes;

pub(crate) use service::AppState;

use log::info;

/// Binds the configured interface/port and serves the API router until the
/// process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_address = format!(
        "{}:{}",
        app_state.config.interface.as_deref().unwrap_or("127.0.0.1"),
        app_state.config.port
    );

    let router = define_routes(app_state);

    info!("Listening on {listen_address}");

    let listener = tokio::net::TcpListener::bind(&listen_address).await?;

    axum::serve(listener, router).await
}
