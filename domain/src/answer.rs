use crate::answers::Model;
use crate::error::Error;
use entity_api::{answer, question};
use events::{DomainEvent, EventKind, EventPublisher};
use sea_orm::DatabaseConnection;

use entity::Id;

pub use entity_api::answer::{delete_by_id, find_by_question_id};

/// Answers a question. Frozen questions reject new answers; the lookup also
/// confirms the question belongs to the bound tenant before anything is
/// written.
pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    answer_model: Model,
) -> Result<Model, Error> {
    let question = question::find_by_id(db, answer_model.question_id).await?;

    if question.frozen {
        return Err(Error::invalid(format!(
            "Question {} is frozen and does not accept answers",
            question.id
        )));
    }

    let answer = answer::create(db, answer_model).await?;

    let event = DomainEvent::new(
        EventKind::QuestionAnswered,
        answer.tenant_id,
        serde_json::to_value(&answer)?,
    );
    event_publisher.publish(event).await;

    Ok(answer)
}

pub async fn find_by_question(
    db: &DatabaseConnection,
    question_id: Id,
) -> Result<Vec<Model>, Error> {
    let answers = answer::find_by_question_id(db, question_id).await?;
    Ok(answers)
}
