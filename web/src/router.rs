use crate::{
    controller::health_check_controller, middleware::tenant::resolve_tenant, params, AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::controller::{answer_controller, question_controller, tag_controller};
use crate::sse::handler::tenant_events;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Townhall API"
        ),
        paths(
            question_controller::create,
            question_controller::update,
            question_controller::index,
            question_controller::read,
            question_controller::upvote,
            question_controller::set_pinned,
            question_controller::set_frozen,
            question_controller::delete,
            answer_controller::create,
            answer_controller::index,
            answer_controller::delete,
            tag_controller::create,
            tag_controller::index,
            tag_controller::delete,
        ),
        components(
            schemas(
                domain::answers::Model,
                domain::questions::Model,
                domain::tags::Model,
                domain::tenants::Model,
                params::question::PinnedParams,
                params::question::FrozenParams,
            )
        ),
        tags(
            (name = "townhall", description = "Townhall multi-tenant Q&A API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    // In-memory sessions only remember the last resolved tenant slug; losing
    // them on restart merely forces clients to re-identify their tenant.
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    Router::new()
        .merge(question_routes(app_state.clone()))
        .merge(answer_routes(app_state.clone()))
        .merge(tag_routes(app_state.clone()))
        .merge(events_routes(app_state.clone()))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
        .layer(session_layer)
}

fn question_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/questions", post(question_controller::create))
        .route("/questions", get(question_controller::index))
        .route("/questions/:id", get(question_controller::read))
        .route("/questions/:id", put(question_controller::update))
        .route("/questions/:id", delete(question_controller::delete))
        .route("/questions/:id/upvote", post(question_controller::upvote))
        .route("/questions/:id/pinned", put(question_controller::set_pinned))
        .route("/questions/:id/frozen", put(question_controller::set_frozen))
        .route_layer(from_fn_with_state(app_state.clone(), resolve_tenant))
        .with_state(app_state)
}

fn answer_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/questions/:question_id/answers",
            post(answer_controller::create),
        )
        .route(
            "/questions/:question_id/answers",
            get(answer_controller::index),
        )
        .route("/answers/:id", delete(answer_controller::delete))
        .route_layer(from_fn_with_state(app_state.clone(), resolve_tenant))
        .with_state(app_state)
}

fn tag_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/questions/:question_id/tags", post(tag_controller::create))
        .route("/questions/:question_id/tags", get(tag_controller::index))
        .route("/tags/:id", delete(tag_controller::delete))
        .route_layer(from_fn_with_state(app_state.clone(), resolve_tenant))
        .with_state(app_state)
}

fn events_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(tenant_events))
        .route_layer(from_fn_with_state(app_state.clone(), resolve_tenant))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}
