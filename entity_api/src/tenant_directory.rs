//! Lookup against the tenant directory.
//!
//! The tenants table is the one deliberately unguarded surface in this crate:
//! it is consulted *before* any tenant context exists, to establish one.

use super::error::Error;
use entity::tenants::{Column, Entity, Model};
use sea_orm::{entity::prelude::*, DatabaseConnection};

pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(db)
        .await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_by_slug_returns_the_matching_tenant() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let tenant_model = Model {
            id: Id::new_v4(),
            slug: "acme".to_owned(),
            name: "Acme Corp".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tenant_model.clone()]])
            .into_connection();

        let found = find_by_slug(&db, "acme").await?;

        assert_eq!(found.map(|t| t.id), Some(tenant_model.id));

        Ok(())
    }

    #[tokio::test]
    async fn find_by_slug_returns_none_for_an_unknown_slug() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let found = find_by_slug(&db, "missing").await?;

        assert!(found.is_none());

        Ok(())
    }
}
