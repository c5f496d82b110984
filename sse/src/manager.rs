use crate::connection::{ConnectionId, ConnectionRegistry, FrameSender, TenantId};
use events::{DomainEvent, EventKind};
use log::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The process-wide event bus: owns the connection registry and delivers
/// domain events exactly to the connections of the matching tenant.
///
/// One instance is constructed at the composition root and shared by the push
/// endpoint (subscribe/unsubscribe) and the domain event handler (publish).
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Register a new connection under its owning tenant and return its unique ID
    pub fn subscribe(&self, tenant_id: TenantId, sender: FrameSender) -> ConnectionId {
        let connection_id = self.registry.register(tenant_id, sender);
        info!("Registered new SSE connection for tenant {tenant_id}");
        connection_id
    }

    /// Remove a connection by ID; safe to call for an already-absent connection
    pub fn unsubscribe(&self, connection_id: &ConnectionId) {
        info!("Unregistering SSE connection {}", connection_id.as_str());
        self.registry.unregister(connection_id);
    }

    /// Deliver one domain event to every active connection of its tenant.
    ///
    /// "Nobody listening" is a normal outcome, not an error. When a tenant
    /// context is bound to the calling task, the event's tenant must match
    /// it; a mismatched event is dropped rather than risk cross-tenant
    /// delivery. A dead connection discovered during fan-out is reaped
    /// without affecting delivery to the rest.
    pub fn publish(&self, event: &DomainEvent) {
        if let Ok(identity) = tenant::current() {
            if identity.tenant_id != event.tenant_id {
                error!(
                    "Dropping {} event for tenant {} published under tenant context {} ({})",
                    event.kind.as_str(),
                    event.tenant_id,
                    identity.tenant_id,
                    identity.tenant_slug,
                );
                return;
            }
        }

        let frame = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize SSE event: {e}");
                return;
            }
        };

        let delivered = self.registry.send_to_tenant(&event.tenant_id, &frame);
        debug!(
            "Delivered {} event to {delivered} connection(s) of tenant {}",
            event.kind.as_str(),
            event.tenant_id
        );
    }

    /// Publish a synthetic heartbeat to every tenant with at least one
    /// connection. Keeps intermediary proxies from timing out idle
    /// connections and surfaces dead connections through the same
    /// write-failure path as real events.
    pub fn heartbeat_tick(&self) {
        for tenant_id in self.registry.tenant_ids() {
            let event = DomainEvent::new(EventKind::Heartbeat, tenant_id, json!({}));
            self.publish(&event);
        }
    }

    /// Spawn the background heartbeat loop. Runs for the process lifetime,
    /// independent of any request.
    pub fn spawn_heartbeat(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so a fresh
            // process doesn't heartbeat before any connection exists.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                manager.heartbeat_tick();
            }
        })
    }

    /// Number of registered connections for one tenant
    pub fn tenant_connection_count(&self, tenant_id: &TenantId) -> usize {
        self.registry.tenant_connection_count(tenant_id)
    }

    /// Total number of registered connections
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
