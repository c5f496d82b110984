use crate::error::Error;
use crate::questions::Model;
use entity_api::{question, IntoQueryFilterMap};
use events::{DomainEvent, EventKind, EventPublisher};
use sea_orm::DatabaseConnection;

use entity::Id;

pub use entity_api::question::{find_by_id, update};

pub async fn find_by<P>(db: &DatabaseConnection, params: P) -> Result<Vec<Model>, Error>
where
    P: IntoQueryFilterMap,
{
    let questions = question::find_by(db, params).await?;
    Ok(questions)
}

pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    question_model: Model,
) -> Result<Model, Error> {
    let question = question::create(db, question_model).await?;

    publish(event_publisher, EventKind::QuestionCreated, &question).await?;

    Ok(question)
}

pub async fn upvote(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
) -> Result<Model, Error> {
    let question = question::upvote(db, id).await?;

    publish(event_publisher, EventKind::QuestionUpvoted, &question).await?;

    Ok(question)
}

pub async fn set_pinned(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    pinned: bool,
) -> Result<Model, Error> {
    let question = question::set_pinned(db, id, pinned).await?;

    publish(event_publisher, EventKind::QuestionPinned, &question).await?;

    Ok(question)
}

pub async fn set_frozen(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    frozen: bool,
) -> Result<Model, Error> {
    let question = question::set_frozen(db, id, frozen).await?;

    publish(event_publisher, EventKind::QuestionFrozen, &question).await?;

    Ok(question)
}

pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    question::delete_by_id(db, id).await?;
    Ok(())
}

// Events fire only after the write has committed; a failed write never
// reaches subscribers.
async fn publish(
    event_publisher: &EventPublisher,
    kind: EventKind,
    question: &Model,
) -> Result<(), Error> {
    let event = DomainEvent::new(kind, question.tenant_id, serde_json::to_value(question)?);
    event_publisher.publish(event).await;
    Ok(())
}
