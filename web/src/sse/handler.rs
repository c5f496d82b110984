use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use events::{DomainEvent, EventKind};
use futures::Stream;
use log::*;
use serde_json::json;
use sse::connection::ConnectionId;
use sse::Manager;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Deregisters the connection when the response body is dropped.
///
/// Cleanup must not live after the receive loop inside the stream: when a
/// client disconnects, Axum drops the body without polling it to completion,
/// so code following the loop never runs. Tying deregistration to `Drop`
/// covers graceful ends, disconnects, and panics alike.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        debug!(
            "SSE connection {} closed, cleaning up",
            self.connection_id.as_str()
        );
        self.manager.unsubscribe(&self.connection_id);
    }
}

/// GET the tenant's live event stream.
///
/// Establishes a long-lived connection that receives every event of the
/// request's tenant, starting with a synthetic `connected` event. The tenant
/// identity is captured from the request context up front; the stream itself
/// outlives the request scope.
pub(crate) async fn tenant_events(
    State(app_state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let identity = tenant::current()?;

    debug!(
        "Establishing SSE connection for tenant {} ({})",
        identity.tenant_id, identity.tenant_slug
    );

    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = app_state.sse_manager.subscribe(identity.tenant_id, tx.clone());

    // The connected event goes straight into this connection's channel rather
    // than through the bus; other connections of the tenant must not see it.
    let connected = DomainEvent::new(
        EventKind::Connected,
        identity.tenant_id,
        json!({ "connectionId": connection_id.as_str() }),
    );
    match serde_json::to_string(&connected) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(e) => error!("Failed to serialize connected event: {e}"),
    }

    let guard = ConnectionGuard {
        manager: app_state.sse_manager.clone(),
        connection_id,
    };

    let stream = stream! {
        let _guard = guard;

        while let Some(frame) = rx.recv().await {
            yield Ok(Event::default().data(frame));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
