//! Tenant identity and the task-local tenant context store.
//!
//! Every inbound request (and every long-lived push connection) is resolved to
//! exactly one tenant before any business logic runs. That identity is bound
//! with [`scope`] for the duration of the request's future and read back with
//! [`current`] anywhere in the call graph, without threading it through every
//! function signature.
//!
//! The binding is task-local, not global: two requests interleaved on the same
//! worker can never observe each other's tenant. The binding is released when
//! the scoped future completes, on every exit path including panics.
//!
//! [`current`] outside any scope is an error, never a default. A missing
//! tenant context must not be interpreted as "no tenant filter".

use serde::Serialize;
use std::future::Future;

pub mod error;

pub use error::{Error, TenantErrorKind};

/// A type alias that represents any entity's internal id field data type.
/// Matches the definition in the entity crate.
pub type Id = uuid::Uuid;

/// The resolved identity of a single tenant. Immutable once resolved; each
/// request gets its own clone rather than a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantIdentity {
    pub tenant_id: Id,
    pub tenant_slug: String,
}

impl TenantIdentity {
    pub fn new(tenant_id: Id, tenant_slug: impl Into<String>) -> Self {
        Self {
            tenant_id,
            tenant_slug: tenant_slug.into(),
        }
    }
}

tokio::task_local! {
    static CURRENT_TENANT: TenantIdentity;
}

/// Runs `future` with `identity` bound as the current tenant for the calling
/// task and all work awaited from it. The binding ends when the future
/// completes.
pub fn scope<F>(identity: TenantIdentity, future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    CURRENT_TENANT.scope(identity, future)
}

/// Returns the tenant bound to the calling task.
///
/// Fails with `NoContextBound` when called outside any [`scope`]. There is no
/// degraded mode; callers must propagate this error.
pub fn current() -> Result<TenantIdentity, Error> {
    CURRENT_TENANT
        .try_with(|identity| identity.clone())
        .map_err(|_| Error {
            source: None,
            error_kind: TenantErrorKind::NoContextBound,
        })
}
