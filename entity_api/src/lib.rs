use chrono::Utc;
use log::*;
use sea_orm::{DatabaseConnection, Value};
use std::collections::HashMap;

pub use entity::{answers, questions, tags, tenants, Id};

pub mod answer;
pub mod error;
pub mod guard;
pub mod query;
pub mod question;
pub mod tag;
pub mod tenant_directory;

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// This structure is particularly useful in scenarios where you need to pass filter parameters
/// from a web request down to the database query layer in a type-safe and organized manner.
/// Note that the tenant predicate is never carried in this map; the data access
/// guard ANDs it onto every query unconditionally.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("question_id".to_string(), Some(Value::String(Some(Box::new("a_question_id".to_string())))));
/// let filter_value = query_filter_map.get("question_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// `IntoQueryFilterMap` is a trait that provides a method for converting a struct into a `QueryFilterMap`.
/// This is particularly useful for translating data between different layers of the application,
/// such as from web request parameters to database query filters.
///
/// Implementing this trait for a struct allows you to define how the fields of the struct should be
/// mapped to the keys and values of the `QueryFilterMap`. This ensures that the data is passed
/// in a type-safe and organized manner.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Seeds a demo tenant directory plus a handful of questions per tenant.
/// Tenant-owned rows are written through the guarded entity API inside each
/// tenant's own context scope, the same way request handlers write them.
pub async fn seed_database(db: &DatabaseConnection) {
    use sea_orm::{ActiveModelTrait, Set};

    let now = Utc::now();

    for (slug, name) in [("acme", "Acme Corp"), ("globex", "Globex Inc")] {
        let tenant_model = tenants::ActiveModel {
            id: Set(Id::new_v4()),
            slug: Set(slug.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap_or_else(|err| panic!("Failed to seed tenant {slug}: {err}"));

        info!("Seeded tenant {} ({})", tenant_model.slug, tenant_model.id);

        let identity = tenant::TenantIdentity::new(tenant_model.id, slug);

        tenant::scope(identity, async {
            for body in [
                format!("What is on the {name} roadmap for next quarter?"),
                format!("When is the next {name} all-hands?"),
            ] {
                let question = questions::Model {
                    id: Id::new_v4(),
                    tenant_id: Id::new_v4(), // overwritten by the guard
                    author_name: Some("seed".to_string()),
                    body,
                    upvotes: 0,
                    pinned: false,
                    frozen: false,
                    created_at: now.into(),
                    updated_at: now.into(),
                };

                question::create(db, question)
                    .await
                    .unwrap_or_else(|err| panic!("Failed to seed question: {err}"));
            }
        })
        .await;
    }
}
