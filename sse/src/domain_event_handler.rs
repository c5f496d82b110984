use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by forwarding them to the SSE manager for delivery
/// to the owning tenant's connections.
///
/// The domain layer stamps each event with the tenant that produced it; this
/// handler only routes. Tenant re-validation happens inside the publisher and
/// the manager, not here.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        debug!(
            "Routing {} event for tenant {} to SSE connections",
            event.kind.as_str(),
            event.tenant_id
        );

        self.sse_manager.publish(event);
    }
}
