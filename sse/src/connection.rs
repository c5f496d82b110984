use dashmap::DashMap;
use log::*;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

// Type alias for tenant IDs (matches entity::Id)
pub type TenantId = uuid::Uuid;

/// Serialized SSE frames are handed to each connection's transport channel as
/// ready-to-send strings; the web layer wraps them into `data:` frames.
pub type FrameSender = UnboundedSender<String>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of a registered connection.
///
/// `Registering` is the brief window between accept and index insertion.
/// `Active` connections are eligible for broadcast delivery. `Draining` is
/// entered the moment a write fails; no further writes are attempted and the
/// connection is removed (the terminal Closed state is represented by absence
/// from the registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Registering,
    Active,
    Draining,
}

/// Connection information owned exclusively by the registry
#[derive(Debug)]
pub struct ConnectionInfo {
    pub tenant_id: TenantId,
    pub state: ConnectionState,
    pub sender: FrameSender,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// Connection registry with dual indices, keyed by tenant for fan-out.
///
/// The primary map gives O(1) registration and cleanup by connection id. The
/// tenant index holds each tenant's connections as an *ordered* collection
/// behind a mutex: locking it serializes fan-out per tenant, which is what
/// guarantees that events published for one tenant reach each of its
/// connections in publish order. Cross-tenant ordering is not guaranteed.
///
/// Isolation invariant: a connection appears in exactly one tenant's index
/// entry, and that tenant equals the connection's own `tenant_id`. Both maps
/// are only ever mutated through `register`/`unregister`.
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: each tenant's connections in registration order
    tenant_index: DashMap<TenantId, Mutex<Vec<ConnectionId>>>,
}

// A poisoned per-tenant lock only means a panic mid-fan-out; the Vec itself
// is still structurally sound, so keep serving rather than unwinding.
fn lock_ids(ids: &Mutex<Vec<ConnectionId>>) -> MutexGuard<'_, Vec<ConnectionId>> {
    ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            tenant_index: DashMap::new(),
        }
    }

    /// Register a new connection under its owning tenant - O(1)
    pub fn register(&self, tenant_id: TenantId, sender: FrameSender) -> ConnectionId {
        let connection_id = ConnectionId::new();

        // Insert into primary storage in the Registering state
        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                tenant_id,
                state: ConnectionState::Registering,
                sender,
                registered_at: chrono::Utc::now(),
            },
        );

        // Append to the tenant's ordered collection
        lock_ids(
            self.tenant_index
                .entry(tenant_id)
                .or_insert_with(|| Mutex::new(Vec::new()))
                .value(),
        )
        .push(connection_id.clone());

        // Indexed and eligible for delivery
        if let Some(mut info) = self.connections.get_mut(&connection_id) {
            info.state = ConnectionState::Active;
        }

        connection_id
    }

    /// Unregister a connection - O(n) in the owning tenant's connection count.
    /// Idempotent: unregistering an absent connection is a no-op.
    pub fn unregister(&self, connection_id: &ConnectionId) {
        // Remove from primary storage
        if let Some((_, info)) = self.connections.remove(connection_id) {
            let tenant_id = info.tenant_id;

            // Update the tenant index
            if let Some(ids) = self.tenant_index.get(&tenant_id) {
                lock_ids(ids.value()).retain(|id| id != connection_id);
            }

            // Clean up empty tenant entries
            self.tenant_index
                .remove_if(&tenant_id, |_, ids| lock_ids(ids).is_empty());
        }
    }

    /// Send a serialized frame to every Active connection of one tenant.
    ///
    /// Holds the tenant's index lock for the whole pass, serializing fan-out
    /// per tenant. A failed write marks that connection Draining and it is
    /// reaped after the pass; the remaining connections still receive the
    /// frame. Returns the number of connections the frame was delivered to.
    pub fn send_to_tenant(&self, tenant_id: &TenantId, frame: &str) -> usize {
        let mut delivered = 0;
        let mut dead: Vec<ConnectionId> = Vec::new();

        if let Some(ids) = self.tenant_index.get(tenant_id) {
            let ids = lock_ids(ids.value());

            for connection_id in ids.iter() {
                let send_failed = {
                    match self.connections.get(connection_id) {
                        Some(info) if info.state == ConnectionState::Active => {
                            info.sender.send(frame.to_string()).is_err()
                        }
                        _ => continue,
                    }
                };

                if send_failed {
                    warn!(
                        "Failed to send event to connection {}. Connection will be reaped.",
                        connection_id.as_str()
                    );
                    if let Some(mut info) = self.connections.get_mut(connection_id) {
                        info.state = ConnectionState::Draining;
                    }
                    dead.push(connection_id.clone());
                } else {
                    delivered += 1;
                }
            }
        }

        // Reap outside the index lock; unregister re-acquires it.
        for connection_id in dead {
            self.unregister(&connection_id);
        }

        delivered
    }

    /// Tenants that currently hold at least one connection
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        self.tenant_index.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of registered connections for one tenant
    pub fn tenant_connection_count(&self, tenant_id: &TenantId) -> usize {
        self.tenant_index
            .get(tenant_id)
            .map(|ids| lock_ids(ids.value()).len())
            .unwrap_or(0)
    }

    /// Total number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
