//! SeaORM Entity for the questions table.
//! Tenant-owned: every row belongs to exactly one tenant and every query
//! against it must carry the tenant predicate (see `entity_api::guard`).

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::questions::Model)]
#[sea_orm(schema_name = "townhall", table_name = "questions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Owning tenant. Server-assigned from the bound tenant context; any
    /// caller-supplied value is overwritten on create, so request bodies may
    /// omit it.
    #[serde(default)]
    #[schema(value_type = Uuid)]
    pub tenant_id: Id,

    /// Display name of the person asking (no account required)
    pub author_name: Option<String>,

    pub body: String,

    /// Running upvote count
    #[serde(default)]
    pub upvotes: i32,

    /// Pinned questions sort to the top of the board
    #[serde(default)]
    pub pinned: bool,

    /// Frozen questions no longer accept answers or upvotes
    #[serde(default)]
    pub frozen: bool,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenants::Entity",
        from = "Column::TenantId",
        to = "super::tenants::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tenants,

    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,

    #[sea_orm(has_many = "super::tags::Entity")]
    Tags,
}

impl Related<super::tenants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenants.def()
    }
}

impl Related<super::answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_creation_body_may_omit_every_server_assigned_field() {
        let model: Model = serde_json::from_value(serde_json::json!({
            "body": "When does the new office open?",
            "author_name": "casey",
        }))
        .unwrap();

        assert_eq!(model.tenant_id, Id::nil());
        assert_eq!(model.body, "When does the new office open?");
        assert_eq!(model.upvotes, 0);
        assert!(!model.pinned);
        assert!(!model.frozen);
    }
}
