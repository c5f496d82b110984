use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use domain::{IntoQueryFilterMap, QueryFilterMap};

/// Optional filters for listing a tenant's questions. The tenant predicate
/// itself is never a parameter; the data access layer adds it from the bound
/// context.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) pinned: Option<bool>,
    pub(crate) frozen: Option<bool>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();

        if let Some(pinned) = self.pinned {
            query_filter_map.insert("pinned".to_string(), Some(Value::Bool(Some(pinned))));
        }

        if let Some(frozen) = self.frozen {
            query_filter_map.insert("frozen".to_string(), Some(Value::Bool(Some(frozen))));
        }

        query_filter_map
    }
}

/// Request body for PUT /questions/{id}/pinned.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PinnedParams {
    pub(crate) pinned: bool,
}

/// Request body for PUT /questions/{id}/frozen.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct FrozenParams {
    pub(crate) frozen: bool,
}
