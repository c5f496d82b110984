use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::answer as AnswerApi;
use domain::{answers::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST create a new Answer to a Question
#[utoipa::path(
    post,
    path = "/questions/{question_id}/answers",
    params(
        ApiVersion,
        ("question_id" = Uuid, Path, description = "Id of the question being answered")
    ),
    request_body = domain::answers::Model,
    responses(
        (status = 201, description = "Successfully Created a New Answer", body = [domain::answers::Model]),
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
    Json(answer_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Answer for question {question_id} from: {answer_model:?}");

    // The path is authoritative for which question is being answered.
    let answer_model = Model {
        question_id,
        ..answer_model
    };

    let answer = AnswerApi::create(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        answer_model,
    )
    .await?;

    debug!("New Answer: {answer:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), answer)))
}

/// GET all Answers of one Question
#[utoipa::path(
    get,
    path = "/questions/{question_id}/answers",
    params(
        ApiVersion,
        ("question_id" = Uuid, Path, description = "Id of the question whose answers to list")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Answers of the Question", body = [domain::answers::Model]),
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
    debug!("GET all Answers for question {question_id}");

    let answers = AnswerApi::find_by_question(app_state.db_conn_ref(), question_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), answers)))
}

/// DELETE an Answer specified by its id.
#[utoipa::path(
    delete,
    path = "/answers/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Answer id to delete")
    ),
    responses(
        (status = 204, description = "Successfully deleted the Answer"),
        (status = 404, description = "Answer not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Answer by id: {id}");

    AnswerApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
