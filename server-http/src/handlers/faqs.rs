use crate::api::{ErrorResponse, FaqRequest, FaqResponse, ListQuery, MessageResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use lingua::FaqProjection;
use shared::Error;
use tracing::{error, info};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service error to a response. Caller mistakes keep their own
/// message, anything else is logged and reported under `context`.
fn failure(context: &str, e: Error) -> ApiError {
    match e {
        Error::Validation(detail) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid FAQ", detail)),
        ),
        Error::NotFound(detail) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("FAQ not found", detail)),
        ),
        e => {
            error!("{}: {}", context, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(context, e.to_string())),
            )
        }
    }
}

/// Unwrap the JSON body and require both fields
fn read_body(
    context: &str,
    body: Result<Json<FaqRequest>, JsonRejection>,
) -> Result<(String, String), ApiError> {
    let Json(req) = body.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(context, rejection.body_text())),
        )
    })?;

    match req.fields() {
        Some((question, answer)) => Ok((question.to_string(), answer.to_string())),
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                context,
                "Question and answer are required",
            )),
        )),
    }
}

/// GET /faqs?lang=<code>
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FaqProjection>>, ApiError> {
    state
        .faq_service
        .list_faqs(query.lang.as_deref())
        .await
        .map(Json)
        .map_err(|e| failure("Error fetching FAQs", e))
}

/// GET /faqs/{id}
pub async fn get_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FaqResponse>, ApiError> {
    match state.faq_service.get_faq(&id).await {
        Ok(faq) => Ok(Json(faq.into())),
        Err(e) => Err(failure("Error fetching FAQ", e)),
    }
}

/// POST /faqs
pub async fn create_faq(
    State(state): State<AppState>,
    body: Result<Json<FaqRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FaqResponse>), ApiError> {
    let (question, answer) = read_body("Error creating FAQ", body)?;

    match state.faq_service.create_faq(&question, &answer).await {
        Ok(faq) => {
            info!("CREATE_FAQ: id={}", faq.id);
            Ok((StatusCode::CREATED, Json(faq.into())))
        }
        Err(e) => Err(failure("Error creating FAQ", e)),
    }
}

/// PUT /faqs/{id}
pub async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FaqRequest>, JsonRejection>,
) -> Result<Json<FaqResponse>, ApiError> {
    let (question, answer) = read_body("Error updating FAQ", body)?;

    match state.faq_service.update_faq(&id, &question, &answer).await {
        Ok(faq) => {
            info!("UPDATE_FAQ: id={}", faq.id);
            Ok(Json(faq.into()))
        }
        Err(e) => Err(failure("Error updating FAQ", e)),
    }
}

/// DELETE /faqs/{id}
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.faq_service.delete_faq(&id).await {
        Ok(faq) => {
            info!("DELETE_FAQ: id={}", faq.id);
            Ok(Json(MessageResponse::new("FAQ deleted successfully")))
        }
        Err(e) => Err(failure("Error deleting FAQ", e)),
    }
}
