//! Server-Sent Events (SSE) infrastructure for real-time, tenant-scoped updates.
//!
//! This crate is the event bus at the heart of the platform's real-time
//! layer: a registry of long-lived push connections keyed by tenant, with
//! fan-out that delivers each published domain event to exactly the
//! connections of the tenant that produced it.
//!
//! # Architecture
//!
//! - **Tenant-keyed registry**: dual DashMap indices - O(1) connection
//!   management plus a per-tenant *ordered* collection used for fan-out.
//! - **Per-tenant delivery order**: fan-out for one tenant is serialized by
//!   that tenant's index lock, so connections observe events in publish
//!   order. No ordering is guaranteed across tenants.
//! - **Partial-failure isolation**: a write failure marks only that
//!   connection Draining and reaps it; the remaining connections still
//!   receive the event.
//! - **Heartbeat loop**: a background task publishes a synthetic `heartbeat`
//!   event to every tenant with live connections, bounding the staleness
//!   window for silently-vanished clients to one heartbeat interval.
//! - **Ephemeral messages**: events are not buffered. A client that connects
//!   after an event was published has missed it and is expected to fetch
//!   current state on connect.
//!
//! # Message flow
//!
//! 1. Frontend opens `GET /sse?tenant=<slug>`; the tenant resolver middleware
//!    binds the tenant context before the handler runs
//! 2. The handler subscribes the connection under the resolved tenant
//! 3. A controller performs a tenant-scoped write, then publishes a
//!    `DomainEvent` through the `events::EventPublisher`
//! 4. `SseDomainEventHandler` forwards the event to [`Manager::publish`]
//! 5. The registry fans the serialized frame out to that tenant's active
//!    connections only
//!
//! # Modules
//!
//! - `connection`: `ConnectionRegistry` with tenant-keyed dual indices,
//!   connection lifecycle states and reaping
//! - `manager`: subscribe/unsubscribe/publish plus the heartbeat loop
//! - `domain_event_handler`: bridge from the event publisher to the manager

pub mod connection;
pub mod domain_event_handler;
pub mod manager;

pub use domain_event_handler::SseDomainEventHandler;
pub use manager::Manager;

#[cfg(test)]
mod tests {
    use crate::connection::TenantId;
    use crate::{Manager, SseDomainEventHandler};
    use events::{DomainEvent, EventKind, EventPublisher};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn events_are_delivered_only_to_the_owning_tenants_connections() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();
        let globex = TenantId::new_v4();

        let (acme_tx_1, mut acme_rx_1) = mpsc::unbounded_channel();
        let (acme_tx_2, mut acme_rx_2) = mpsc::unbounded_channel();
        let (globex_tx, mut globex_rx) = mpsc::unbounded_channel();

        manager.subscribe(acme, acme_tx_1);
        manager.subscribe(acme, acme_tx_2);
        manager.subscribe(globex, globex_tx);

        for n in 0..5 {
            manager.publish(&DomainEvent::new(
                EventKind::QuestionCreated,
                acme,
                json!({"n": n}),
            ));
        }
        manager.publish(&DomainEvent::new(
            EventKind::QuestionUpvoted,
            globex,
            json!({}),
        ));

        // Each acme connection sees exactly acme's five events, in publish order
        for rx in [&mut acme_rx_1, &mut acme_rx_2] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 5);
            for (n, frame) in frames.iter().enumerate() {
                assert_eq!(frame["type"], "question:created");
                assert_eq!(frame["tenantId"], acme.to_string());
                assert_eq!(frame["data"]["n"], n as i64);
            }
        }

        // The globex connection sees only its own event
        let frames = drain(&mut globex_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "question:upvoted");
        assert_eq!(frames[0]["tenantId"], globex.to_string());
    }

    #[tokio::test]
    async fn publish_to_a_tenant_with_no_connections_is_a_no_op() {
        let manager = Manager::new();

        manager.publish(&DomainEvent::new(
            EventKind::QuestionCreated,
            TenantId::new_v4(),
            json!({}),
        ));

        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn a_dead_connection_does_not_block_fanout_to_the_rest() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();

        let (tx_1, mut rx_1) = mpsc::unbounded_channel();
        let (tx_2, rx_2) = mpsc::unbounded_channel();
        let (tx_3, mut rx_3) = mpsc::unbounded_channel();

        manager.subscribe(acme, tx_1);
        manager.subscribe(acme, tx_2);
        manager.subscribe(acme, tx_3);

        // Simulate the second client vanishing without a clean unsubscribe
        drop(rx_2);

        manager.publish(&DomainEvent::new(EventKind::QuestionPinned, acme, json!({})));

        assert_eq!(drain(&mut rx_1).len(), 1);
        assert_eq!(drain(&mut rx_3).len(), 1);

        // The dead connection was reaped by the write-failure path
        assert_eq!(manager.tenant_connection_count(&acme), 2);
    }

    #[tokio::test]
    async fn a_silently_closed_connection_is_reaped_by_the_heartbeat() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();

        let (tx, rx) = mpsc::unbounded_channel();
        manager.subscribe(acme, tx);
        assert_eq!(manager.tenant_connection_count(&acme), 1);

        drop(rx);
        manager.heartbeat_tick();

        assert_eq!(manager.tenant_connection_count(&acme), 0);
        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn heartbeats_reach_every_tenant_with_connections() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();
        let globex = TenantId::new_v4();

        let (acme_tx, mut acme_rx) = mpsc::unbounded_channel();
        let (globex_tx, mut globex_rx) = mpsc::unbounded_channel();
        manager.subscribe(acme, acme_tx);
        manager.subscribe(globex, globex_tx);

        manager.heartbeat_tick();

        let acme_frames = drain(&mut acme_rx);
        assert_eq!(acme_frames.len(), 1);
        assert_eq!(acme_frames[0]["type"], "heartbeat");
        assert_eq!(acme_frames[0]["tenantId"], acme.to_string());

        let globex_frames = drain(&mut globex_rx);
        assert_eq!(globex_frames.len(), 1);
        assert_eq!(globex_frames[0]["tenantId"], globex.to_string());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();

        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = manager.subscribe(acme, tx);

        manager.unsubscribe(&connection_id);
        manager.unsubscribe(&connection_id);

        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn publish_under_a_mismatched_tenant_context_is_dropped() {
        let manager = Manager::new();
        let acme = TenantId::new_v4();
        let globex = TenantId::new_v4();

        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.subscribe(globex, tx);

        // A handler running under acme's context must not be able to push
        // into globex's connections.
        let bound = tenant::TenantIdentity::new(acme, "acme");
        tenant::scope(bound, async {
            manager.publish(&DomainEvent::new(
                EventKind::QuestionCreated,
                globex,
                json!({}),
            ));
        })
        .await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn published_domain_events_flow_through_the_handler_to_connections() {
        let manager = Arc::new(Manager::new());
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(manager.clone())));

        let acme = TenantId::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.subscribe(acme, tx);

        let bound = tenant::TenantIdentity::new(acme, "acme");
        tenant::scope(
            bound,
            publisher.publish(DomainEvent::new(
                EventKind::QuestionCreated,
                acme,
                json!({"body": "What is the roadmap?"}),
            )),
        )
        .await;

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "question:created");
        assert_eq!(frames[0]["tenantId"], acme.to_string());
        assert_eq!(frames[0]["data"]["body"], "What is the roadmap?");
    }
}
