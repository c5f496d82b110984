//! Event system infrastructure for the Townhall platform.
//!
//! This crate provides the event system that enables loose coupling between
//! domain logic and infrastructure concerns (like SSE notifications).
//!
//! # Architecture
//!
//! - **DomainEvent**: An immutable envelope carrying one business event for
//!   exactly one tenant
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no knowledge of entities or the web layer; entity data is
//! carried as serialized JSON values. Its only internal dependency is the
//! `tenant` crate, because `publish` re-validates that an event's tenant
//! matches the tenant bound to the publishing request rather than trusting
//! the caller.

use async_trait::async_trait;
use log::*;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// The kinds of events the platform emits. `Connected` and `Heartbeat` are
/// synthetic transport-level events constructed by the SSE layer; the rest are
/// emitted by domain operations after a successful tenant-scoped write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "heartbeat")]
    Heartbeat,
    #[serde(rename = "question:created")]
    QuestionCreated,
    #[serde(rename = "question:upvoted")]
    QuestionUpvoted,
    #[serde(rename = "question:answered")]
    QuestionAnswered,
    #[serde(rename = "question:tagged")]
    QuestionTagged,
    #[serde(rename = "question:pinned")]
    QuestionPinned,
    #[serde(rename = "question:frozen")]
    QuestionFrozen,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Heartbeat => "heartbeat",
            EventKind::QuestionCreated => "question:created",
            EventKind::QuestionUpvoted => "question:upvoted",
            EventKind::QuestionAnswered => "question:answered",
            EventKind::QuestionTagged => "question:tagged",
            EventKind::QuestionPinned => "question:pinned",
            EventKind::QuestionFrozen => "question:frozen",
        }
    }
}

/// An immutable domain event scoped to exactly one tenant.
///
/// Serializes to the wire shape consumed by SSE clients:
/// `{"type": ..., "tenantId": ..., "data": ..., "timestamp": ...}` where
/// `timestamp` is Unix milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "tenantId")]
    pub tenant_id: Id,
    #[serde(rename = "data")]
    pub payload: Value,
    pub timestamp: i64,
}

impl DomainEvent {
    pub fn new(kind: EventKind, tenant_id: Id, payload: Value) -> Self {
        Self {
            kind,
            tenant_id,
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like pushing SSE notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    ///
    /// When a tenant context is bound to the publishing task, the event's
    /// tenant must match it. A mismatch means a handler constructed an event
    /// for a tenant other than the one that owns the request; the event is
    /// dropped rather than risk cross-tenant delivery.
    pub async fn publish(&self, event: DomainEvent) {
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

        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingHandler {
        seen: Mutex<Vec<DomainEvent>>,
    }

    impl RecordingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn domain_event_serializes_to_the_wire_envelope() {
        let tenant_id = Id::new_v4();
        let event = DomainEvent::new(
            EventKind::QuestionCreated,
            tenant_id,
            json!({"id": "q1", "body": "What is the roadmap?"}),
        );

        let value: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "question:created");
        assert_eq!(value["tenantId"], tenant_id.to_string());
        assert_eq!(value["data"]["body"], "What is the roadmap?");
        assert!(value["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn publish_dispatches_to_handlers_in_registration_order() {
        let first = RecordingHandler::new();
        let second = RecordingHandler::new();
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        let event = DomainEvent::new(EventKind::QuestionUpvoted, Id::new_v4(), json!({}));
        publisher.publish(event).await;

        assert_eq!(first.seen.lock().unwrap().len(), 1);
        assert_eq!(second.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn publish_drops_events_whose_tenant_differs_from_the_bound_context() {
        let handler = RecordingHandler::new();
        let publisher = EventPublisher::new().with_handler(handler.clone());

        let bound = tenant::TenantIdentity::new(Id::new_v4(), "acme");
        let foreign_event = DomainEvent::new(EventKind::QuestionCreated, Id::new_v4(), json!({}));

        tenant::scope(bound, publisher.publish(foreign_event)).await;

        assert!(handler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_delivers_events_matching_the_bound_context() {
        let handler = RecordingHandler::new();
        let publisher = EventPublisher::new().with_handler(handler.clone());

        let tenant_id = Id::new_v4();
        let bound = tenant::TenantIdentity::new(tenant_id, "acme");
        let event = DomainEvent::new(EventKind::QuestionAnswered, tenant_id, json!({}));

        tenant::scope(bound, publisher.publish(event)).await;

        assert_eq!(handler.seen.lock().unwrap().len(), 1);
    }
}
