use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::question::{FrozenParams, IndexParams, PinnedParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::question as QuestionApi;
use domain::{questions::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST create a new Question
#[utoipa::path(
    post,
    path = "/questions",
    params(ApiVersion),
    request_body = domain::questions::Model,
    responses(
        (status = 201, description = "Successfully Created a New Question", body = [domain::questions::Model]),
        (status = 404, description = "Tenant not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(question_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Question from: {question_model:?}");

    let question = QuestionApi::create(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        question_model,
    )
    .await?;

    debug!("New Question: {question:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), question)))
}

/// GET a particular Question specified by its id.
#[utoipa::path(
    get,
    path = "/questions/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Question id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific Question by its id", body = [domain::questions::Model]),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Question by id: {id}");

    let question = QuestionApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), question)))
}

/// GET all Questions of the request's tenant
#[utoipa::path(
    get,
    path = "/questions",
    params(
        ApiVersion,
        ("pinned" = Option<bool>, Query, description = "Filter by pinned state"),
        ("frozen" = Option<bool>, Query, description = "Filter by frozen state")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Questions", body = [domain::questions::Model]),
        (status = 404, description = "Tenant not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Questions");
    debug!("Filter Params: {params:?}");

    let questions = QuestionApi::find_by(app_state.db_conn_ref(), params).await?;

    debug!("Found Questions: {questions:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), questions)))
}

#[utoipa::path(
    put,
    path = "/questions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of question to update"),
    ),
    request_body = domain::questions::Model,
    responses(
        (status = 200, description = "Successfully Updated Question", body = [domain::questions::Model]),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(question_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Question with id: {id}");

    let question = QuestionApi::update(app_state.db_conn_ref(), id, question_model).await?;

    debug!("Updated Question: {question:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), question)))
}

/// POST register one upvote on a Question
#[utoipa::path(
    post,
    path = "/questions/{id}/upvote",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of question to upvote"),
    ),
    responses(
        (status = 200, description = "Successfully Upvoted Question", body = [domain::questions::Model]),
        (status = 404, description = "Question not found or frozen"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn upvote(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Upvote Question with id: {id}");

    let question = QuestionApi::upvote(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), question)))
}

/// PUT set a Question's pinned state
#[utoipa::path(
    put,
    path = "/questions/{id}/pinned",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of question to pin or unpin"),
    ),
    request_body = crate::params::question::PinnedParams,
    responses(
        (status = 200, description = "Successfully Updated Question", body = [domain::questions::Model]),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn set_pinned(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<PinnedParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Question pinned state with id: {id}");

    let question = QuestionApi::set_pinned(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        id,
        params.pinned,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), question)))
}

/// PUT set a Question's frozen state
#[utoipa::path(
    put,
    path = "/questions/{id}/frozen",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of question to freeze or unfreeze"),
    ),
    request_body = crate::params::question::FrozenParams,
    responses(
        (status = 200, description = "Successfully Updated Question", body = [domain::questions::Model]),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn set_frozen(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<FrozenParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Question frozen state with id: {id}");

    let question = QuestionApi::set_frozen(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        id,
        params.frozen,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), question)))
}

/// DELETE a Question specified by its id.
#[utoipa::path(
    delete,
    path = "/questions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Question id to delete")
    ),
    responses(
        (status = 204, description = "Successfully deleted the Question"),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Question by id: {id}");

    QuestionApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
