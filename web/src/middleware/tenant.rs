use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;
use service::config::X_TENANT;
use tokio::time::{timeout, Duration};
use tower_sessions::Session;

/// Session key holding a tenant slug placed there by whatever established the
/// session. The resolver only ever reads it; resolution itself leaves the
/// session untouched, so a tenant chosen via query or header on one request
/// never carries over to the next.
pub(crate) const SESSION_TENANT_KEY: &str = "tenant_slug";

/// Query parameter carrying an explicit tenant selection.
const TENANT_QUERY_PARAM: &str = "tenant";

/// Tenant resolver middleware that returns 404 Not Found for requests that
/// cannot be attributed to a known tenant.
///
/// Every guarded route runs through here before its handler. The resolved
/// identity is bound as the task-local tenant context around `next.run`, so
/// handlers and everything below them read it with `tenant::current()` rather
/// than carrying it in function signatures. An unresolvable tenant always
/// refuses the request; there is no "unscoped" fallback.
pub async fn resolve_tenant(
    State(app_state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let session_slug: Option<String> = session.get(SESSION_TENANT_KEY).await.ok().flatten();

    let slug = match requested_slug(
        request.uri().query(),
        request.headers(),
        session_slug,
        app_state.config.default_tenant_slug(),
    ) {
        Some(slug) => slug,
        None => {
            info!("Request carries no tenant selection and no default tenant is configured");
            return (StatusCode::NOT_FOUND, "TENANT NOT FOUND").into_response();
        }
    };

    let lookup = domain::tenant_directory::resolve_slug(app_state.db_conn_ref(), &slug);

    let identity = match timeout(
        Duration::from_millis(app_state.config.tenant_lookup_timeout_ms),
        lookup,
    )
    .await
    {
        Ok(Ok(Some(identity))) => identity,
        Ok(Ok(None)) => {
            info!("Refusing request for unknown tenant slug: {slug}");
            return (StatusCode::NOT_FOUND, "TENANT NOT FOUND").into_response();
        }
        Ok(Err(err)) => return crate::Error::from(err).into_response(),
        // A directory lookup that cannot complete in time is indistinguishable
        // from "no such tenant" as far as the client is concerned.
        Err(_) => {
            warn!(
                "Tenant directory lookup for {slug} exceeded {}ms",
                app_state.config.tenant_lookup_timeout_ms
            );
            return (StatusCode::NOT_FOUND, "TENANT NOT FOUND").into_response();
        }
    };

    tenant::scope(identity, next.run(request)).await
}

/// Picks the tenant slug a request is asking for, in priority order:
/// explicit query parameter, then `x-tenant` header, then the slug remembered
/// in the session, then the configured default.
fn requested_slug(
    query: Option<&str>,
    headers: &HeaderMap,
    session_slug: Option<String>,
    default_slug: Option<String>,
) -> Option<String> {
    slug_from_query(query)
        .or_else(|| slug_from_headers(headers))
        .or(session_slug)
        .or(default_slug)
        .filter(|slug| !slug.is_empty())
}

fn slug_from_query(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("tenant=").map(str::to_string))
        .filter(|slug| !slug.is_empty())
}

fn slug_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_TENANT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|slug| !slug.is_empty())
}

#[cfg(test)]
mod slug_tests {
    use super::*;

    fn headers_with_tenant(slug: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_TENANT, slug.parse().unwrap());
        headers
    }

    #[test]
    fn query_parameter_wins_over_everything_else() {
        let slug = requested_slug(
            Some("page=2&tenant=acme"),
            &headers_with_tenant("globex"),
            Some("initech".to_string()),
            Some("hooli".to_string()),
        );

        assert_eq!(slug.as_deref(), Some("acme"));
    }

    #[test]
    fn header_wins_over_session_and_default() {
        let slug = requested_slug(
            Some("page=2"),
            &headers_with_tenant("globex"),
            Some("initech".to_string()),
            Some("hooli".to_string()),
        );

        assert_eq!(slug.as_deref(), Some("globex"));
    }

    #[test]
    fn session_wins_over_default() {
        let slug = requested_slug(
            None,
            &HeaderMap::new(),
            Some("initech".to_string()),
            Some("hooli".to_string()),
        );

        assert_eq!(slug.as_deref(), Some("initech"));
    }

    #[test]
    fn default_applies_when_nothing_else_is_present() {
        let slug = requested_slug(None, &HeaderMap::new(), None, Some("hooli".to_string()));

        assert_eq!(slug.as_deref(), Some("hooli"));
    }

    #[test]
    fn no_selection_anywhere_yields_none() {
        assert_eq!(requested_slug(None, &HeaderMap::new(), None, None), None);
    }

    #[test]
    fn empty_query_value_is_ignored() {
        let slug = requested_slug(
            Some("tenant="),
            &headers_with_tenant("globex"),
            None,
            None,
        );

        assert_eq!(slug.as_deref(), Some("globex"));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body, http::Request as HttpRequest, middleware::from_fn_with_state, routing::get,
        Router,
    };
    use events::EventPublisher;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    async fn probe() -> String {
        tenant::current()
            .map(|identity| identity.tenant_slug)
            .unwrap_or_else(|_| "unscoped".to_string())
    }

    fn app(db: sea_orm::DatabaseConnection) -> Router {
        let app_state = AppState::new(
            Config::default(),
            &Arc::new(db),
            Arc::new(sse::Manager::new()),
            EventPublisher::new(),
        );

        let session_store = MemoryStore::default();
        let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

        Router::new()
            .route("/probe", get(probe))
            .route_layer(from_fn_with_state(app_state.clone(), resolve_tenant))
            .layer(session_layer)
            .with_state(app_state)
    }

    fn tenant_row(slug: &str) -> domain::tenants::Model {
        let now = chrono::Utc::now();
        domain::tenants::Model {
            id: uuid::Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn a_known_slug_binds_the_tenant_context_for_the_handler() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tenant_row("acme")]])
            .into_connection();

        let request = HttpRequest::builder()
            .uri("/probe?tenant=acme")
            .body(Body::empty())
            .unwrap();

        let response = app(db).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"acme");
    }

    #[tokio::test]
    async fn an_unknown_slug_is_refused_with_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<domain::tenants::Model>::new()])
            .into_connection();

        let request = HttpRequest::builder()
            .uri("/probe?tenant=nonesuch")
            .body(Body::empty())
            .unwrap();

        let response = app(db).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn an_explicit_selection_does_not_stick_to_later_requests() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tenant_row("acme")]])
            .into_connection();

        let app = app(db);

        let first = HttpRequest::builder()
            .uri("/probe?tenant=acme")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(first).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Echo back any cookie the first response set, as a browser would. The
        // follow-up request carries no selection of its own and must not
        // inherit the first request's tenant.
        let mut second = HttpRequest::builder().uri("/probe");
        if let Some(cookie) = response.headers().get(axum::http::header::SET_COOKIE) {
            second = second.header(axum::http::header::COOKIE, cookie.clone());
        }
        let request = second.body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn a_request_without_any_tenant_selection_is_refused_with_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let request = HttpRequest::builder()
            .uri("/probe")
            .body(Body::empty())
            .unwrap();

        let response = app(db).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
