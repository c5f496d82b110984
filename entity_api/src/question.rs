use super::error::{EntityApiErrorKind, Error};
use crate::{guard, query, IntoQueryFilterMap};
use entity::questions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};
use tenant::TenantIdentity;

use log::*;

pub async fn create(db: &DatabaseConnection, question_model: Model) -> Result<Model, Error> {
    let identity = guard::scoped_tenant::<Entity>()?;

    debug!(
        "New Question Model to be inserted for tenant {}: {question_model:?}",
        identity.tenant_slug
    );

    Ok(active_model_for_create(question_model, &identity)
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
        author_name: Set(model.author_name),
        body: Set(model.body),
        upvotes: Set(0),
        pinned: Set(false),
        frozen: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    guard::find_by_id::<Entity>(db, id)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

pub async fn find_by<P>(db: &DatabaseConnection, params: P) -> Result<Vec<Model>, Error>
where
    P: IntoQueryFilterMap,
{
    query::find_by::<Entity, Column>(db, params.into_query_filter_map()).await
}

pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    // Tenant-filtered lookup: an id owned by another tenant is simply not found.
    let result = guard::find_by_id::<Entity>(db, id).await?;

    match result {
        Some(question) => {
            debug!("Existing Question model to be Updated: {question:?}");

            let active_model = ActiveModel {
                id: Unchanged(question.id),
                tenant_id: Unchanged(question.tenant_id),
                author_name: Set(model.author_name),
                body: Set(model.body),
                upvotes: Unchanged(question.upvotes),
                pinned: Unchanged(question.pinned),
                frozen: Unchanged(question.frozen),
                created_at: Unchanged(question.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            error!("Question with id {id} not found");

            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordNotFound,
            })
        }
    }
}

/// Atomically increments the upvote count of a question within the bound
/// tenant. Frozen questions do not accept upvotes.
pub async fn upvote(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let condition = guard::tenant_condition::<Entity>()?
        .add(Column::Id.eq(id))
        .add(Column::Frozen.eq(false));

    let result = Entity::update_many()
        .col_expr(Column::Upvotes, Expr::col(Column::Upvotes).add(1))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(condition)
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }

    find_by_id(db, id).await
}

pub async fn set_pinned(db: &DatabaseConnection, id: Id, pinned: bool) -> Result<Model, Error> {
    let result = guard::find_by_id::<Entity>(db, id).await?;

    match result {
        Some(question) => {
            let active_model = ActiveModel {
                id: Unchanged(question.id),
                tenant_id: Unchanged(question.tenant_id),
                author_name: Unchanged(question.author_name),
                body: Unchanged(question.body),
                upvotes: Unchanged(question.upvotes),
                pinned: Set(pinned),
                frozen: Unchanged(question.frozen),
                created_at: Unchanged(question.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

pub async fn set_frozen(db: &DatabaseConnection, id: Id, frozen: bool) -> Result<Model, Error> {
    let result = guard::find_by_id::<Entity>(db, id).await?;

    match result {
        Some(question) => {
            let active_model = ActiveModel {
                id: Unchanged(question.id),
                tenant_id: Unchanged(question.tenant_id),
                author_name: Unchanged(question.author_name),
                body: Unchanged(question.body),
                upvotes: Unchanged(question.upvotes),
                pinned: Unchanged(question.pinned),
                frozen: Set(frozen),
                created_at: Unchanged(question.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
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

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase, MockExecResult};

    fn question_model(tenant_id: Id) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            tenant_id,
            author_name: Some("dana".to_owned()),
            body: "What is the plan for Q3?".to_owned(),
            upvotes: 0,
            pinned: false,
            frozen: false,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn create_overwrites_a_caller_supplied_tenant_id() {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");
        let foreign_tenant = Id::new_v4();

        let active_model = active_model_for_create(question_model(foreign_tenant), &identity);

        assert_eq!(
            active_model.tenant_id,
            ActiveValue::Set(identity.tenant_id)
        );
    }

    #[tokio::test]
    async fn create_without_a_bound_context_fails_closed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = create(&db, question_model(Id::new_v4())).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::NoContextBound
        );
    }

    #[tokio::test]
    async fn create_returns_a_new_question_model() -> Result<(), Error> {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");
        let model = question_model(identity.tenant_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let question = tenant::scope(identity, create(&db, model.clone())).await?;

        assert_eq!(question.id, model.id);

        Ok(())
    }

    #[tokio::test]
    async fn update_of_a_cross_tenant_id_reports_not_found() {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");
        let model = question_model(Id::new_v4());

        // The tenant-filtered lookup matches zero rows for a foreign id.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = tenant::scope(identity, update(&db, model.id, model.clone())).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn delete_of_a_cross_tenant_id_reports_not_found() {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = tenant::scope(identity, delete_by_id(&db, Id::new_v4())).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn upvote_increments_and_returns_the_question() -> Result<(), Error> {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");
        let mut model = question_model(identity.tenant_id);
        model.upvotes = 1;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let question = tenant::scope(identity, upvote(&db, model.id)).await?;

        assert_eq!(question.upvotes, 1);

        Ok(())
    }

    #[tokio::test]
    async fn upvote_of_a_frozen_question_reports_not_found() {
        let identity = TenantIdentity::new(Id::new_v4(), "acme");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = tenant::scope(identity, upvote(&db, Id::new_v4())).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
