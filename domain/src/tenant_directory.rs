//! Resolves tenant slugs to identities for the web layer's tenant resolver.

use crate::error::Error;
use entity_api::tenant_directory;
use sea_orm::DatabaseConnection;
use tenant::TenantIdentity;

/// Looks up a tenant by slug and returns the identity that the request scope
/// should be bound to. `None` means no such tenant exists; the caller decides
/// how to refuse the request.
pub async fn resolve_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<TenantIdentity>, Error> {
    let tenant_model = tenant_directory::find_by_slug(db, slug).await?;

    Ok(tenant_model.map(|tenant| TenantIdentity::new(tenant.id, tenant.slug)))
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn resolve_slug_builds_an_identity_from_the_directory_row() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let tenant_model = crate::tenants::Model {
            id: Id::new_v4(),
            slug: "acme".to_owned(),
            name: "Acme Corp".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tenant_model.clone()]])
            .into_connection();

        let identity = resolve_slug(&db, "acme").await?.unwrap();

        assert_eq!(identity.tenant_id, tenant_model.id);
        assert_eq!(identity.tenant_slug, "acme");

        Ok(())
    }

    #[tokio::test]
    async fn resolve_slug_returns_none_for_an_unknown_slug() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<crate::tenants::Model>::new()])
            .into_connection();

        assert!(resolve_slug(&db, "missing").await?.is_none());

        Ok(())
    }
}
