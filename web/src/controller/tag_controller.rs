use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::tag as TagApi;
use domain::{tags::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST attach a new Tag to a Question
#[utoipa::path(
    post,
    path = "/questions/{question_id}/tags",
    params(
        ApiVersion,
        ("question_id" = Uuid, Path, description = "Id of the question being tagged")
    ),
    request_body = domain::tags::Model,
    responses(
        (status = 201, description = "Successfully Created a New Tag", body = [domain::tags::Model]),
        (status = 404, description = "Question not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(question_id): Path<Id>,
    Json(tag_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Tag for question {question_id} from: {tag_model:?}");

    let tag_model = Model {
        question_id,
        ..tag_model
    };

    let tag = TagApi::create(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        tag_model,
    )
    .await?;

    debug!("New Tag: {tag:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), tag)))
}

/// GET all Tags of one Question
#[utoipa::path(
    get,
    path = "/questions/{question_id}/tags",
    params(
        ApiVersion,
        ("question_id" = Uuid, Path, description = "Id of the question whose tags to list")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Tags of the Question", body = [domain::tags::Model]),
        (status = 404, description = "Question not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(question_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Tags for question {question_id}");

    let tags = TagApi::find_by_question_id(app_state.db_conn_ref(), question_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tags)))
}

/// DELETE a Tag specified by its id.
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Tag id to delete")
    ),
    responses(
        (status = 204, description = "Successfully deleted the Tag"),
        (status = 404, description = "Tag not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Tag by id: {id}");

    TagApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
