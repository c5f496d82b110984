//! Data access guard for tenant-owned entities.
//!
//! Every read and write against a tenant-owned table is routed through this
//! module so it is automatically and unforgettably scoped to the tenant bound
//! in the current task's context:
//!
//! * reads AND a `tenant_id = current` predicate into the query filter,
//! * creates overwrite any caller-supplied `tenant_id` with the bound tenant,
//! * updates and deletes carry the predicate in their match clause, so a
//!   cross-tenant record id matches zero rows and surfaces as "not found".
//!
//! The set of tenant-owned tables is a fixed, explicit allow-list. A guard
//! call against a table that is not allow-listed fails with `NotAllowlisted`;
//! a missing tenant context fails with `NoContextBound`. Neither condition
//! ever falls back to an unfiltered query.

use crate::error::{EntityApiErrorKind, Error};
use entity::{answers, questions, tags, Id};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityName, EntityTrait, Iterable,
    PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter,
};
use tenant::TenantIdentity;

/// The fixed allow-list of tenant-owned tables. Entities not named here must
/// never be routed through the guard.
pub const TENANT_OWNED_TABLES: &[&str] = &["questions", "answers", "tags"];

/// Marks an entity as tenant-owned and names its tenant discriminator column.
/// Implementations must be accompanied by an entry in [`TENANT_OWNED_TABLES`].
pub trait TenantScoped: EntityTrait {
    fn tenant_column() -> Self::Column;
}

impl TenantScoped for questions::Entity {
    fn tenant_column() -> Self::Column {
        questions::Column::TenantId
    }
}

impl TenantScoped for answers::Entity {
    fn tenant_column() -> Self::Column {
        answers::Column::TenantId
    }
}

impl TenantScoped for tags::Entity {
    fn tenant_column() -> Self::Column {
        tags::Column::TenantId
    }
}

/// Reads the tenant bound to the calling task for a write against the given
/// tenant-owned entity. Propagates `NoContextBound` when no binding exists
/// and `NotAllowlisted` when the entity is not tenant-owned.
pub fn scoped_tenant<E: TenantScoped>() -> Result<TenantIdentity, Error> {
    ensure_allowlisted::<E>()?;
    Ok(tenant::current()?)
}

fn ensure_allowlisted<E: TenantScoped>() -> Result<(), Error> {
    let entity = E::default();
    let table = entity.table_name();
    if TENANT_OWNED_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::NotAllowlisted,
        })
    }
}

/// Builds the tenant predicate for a tenant-owned entity from the bound
/// context. This is the single place the predicate is constructed; callers
/// conjunctively AND it with their own filters, never OR.
pub fn tenant_condition<E: TenantScoped>() -> Result<Condition, Error> {
    let identity = scoped_tenant::<E>()?;

    Ok(Condition::all().add(E::tenant_column().eq(identity.tenant_id)))
}

/// Finds one record by id within the bound tenant. A record id belonging to a
/// different tenant matches zero rows.
pub async fn find_by_id<E>(db: &DatabaseConnection, id: Id) -> Result<Option<E::Model>, Error>
where
    E: TenantScoped,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Id>,
{
    let condition = tenant_condition::<E>()?;

    Ok(E::find_by_id(id).filter(condition).one(db).await?)
}

/// Deletes one record by id within the bound tenant. Returns the number of
/// rows affected; a cross-tenant id affects zero rows.
pub async fn delete_by_id<E>(db: &DatabaseConnection, id: Id) -> Result<u64, Error>
where
    E: TenantScoped,
{
    let condition = tenant_condition::<E>()?;
    let id_column = E::PrimaryKey::iter()
        .next()
        .ok_or(Error {
            source: None,
            error_kind: EntityApiErrorKind::Other,
        })?
        .into_column();

    let result = E::delete_many()
        .filter(condition.add(id_column.eq(id)))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
