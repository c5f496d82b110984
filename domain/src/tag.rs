use crate::error::Error;
use crate::tags::Model;
use entity_api::tag;
use events::{DomainEvent, EventKind, EventPublisher};
use sea_orm::DatabaseConnection;

pub use entity_api::tag::{delete_by_id, find_by_question_id};

pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    tag_model: Model,
) -> Result<Model, Error> {
    let tag = tag::create(db, tag_model).await?;

    let event = DomainEvent::new(
        EventKind::QuestionTagged,
        tag.tenant_id,
        serde_json::to_value(&tag)?,
    );
    event_publisher.publish(event).await;

    Ok(tag)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use entity::Id;
    use events::EventHandler;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::{Arc, Mutex};
    use tenant::TenantIdentity;

    struct RecordingHandler {
        seen: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn create_publishes_a_question_tagged_event() -> Result<(), Error> {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");
        let now = chrono::Utc::now();
        let model = Model {
            id: Id::new_v4(),
            tenant_id: identity.tenant_id,
            question_id: Id::new_v4(),
            name: "facilities".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });
        let publisher = EventPublisher::new().with_handler(handler.clone());

        tenant::scope(identity, create(&db, &publisher, model.clone())).await?;

        let seen = handler.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::QuestionTagged);
        assert_eq!(seen[0].tenant_id, model.tenant_id);

        Ok(())
    }
}
