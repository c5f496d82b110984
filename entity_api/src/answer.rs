use super::error::{EntityApiErrorKind, Error};
use crate::guard;
use entity::answers::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, QueryOrder, TryIntoModel,
};
use tenant::TenantIdentity;

use log::*;

pub async fn create(db: &DatabaseConnection, answer_model: Model) -> Result<Model, Error> {
    let identity = guard::scoped_tenant::<Entity>()?;

    debug!(
        "New Answer Model to be inserted for tenant {}: {answer_model:?}",
        identity.tenant_slug
    );

    Ok(active_model_for_create(answer_model, &identity)
        .save(db)
        .await?
        .try_into_model()?)
}

// The caller-supplied tenant_id is always discarded in favor of the bound
// tenant context.
fn active_model_for_create(model: Model, identity: &TenantIdentity) -> ActiveModel {
    let now = chrono::Utc::now();

    ActiveModel {
        tenant_id: Set(identity.tenant_id),
        question_id: Set(model.question_id),
        body: Set(model.body),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
}

pub async fn find_by_question_id(
    db: &DatabaseConnection,
    question_id: Id,
) -> Result<Vec<Model>, Error> {
    let condition = guard::tenant_condition::<Entity>()?.add(Column::QuestionId.eq(question_id));

    Ok(Entity::find()
        .filter(condition)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let rows_affected = guard::delete_by_id::<Entity>(db, id).await?;

    if rows_affected == 0 {
        Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
    } else {
        Ok(())
    }
}
