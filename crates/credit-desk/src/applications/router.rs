use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantDetails, ApplicationId};
use super::identifier::IdentifierError;
use super::lifecycle::LifecycleError;
use super::messages::{MessageRepository, ThreadError};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationServiceError, CreditApplicationService};

/// Router builder exposing the intake, review, and messaging endpoints.
pub fn application_router<R, M>(service: Arc<CreditApplicationService<R, M>>) -> Router
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    Router::new()
        .route("/api/applications", post(create_handler::<R, M>))
        .route(
            "/api/applications/:application_id",
            get(get_handler::<R, M>),
        )
        .route(
            "/api/applications/:application_id/messages",
            get(list_messages_handler::<R, M>).post(append_message_handler::<R, M>),
        )
        .route("/api/admin/applications", get(list_handler::<R, M>))
        .route(
            "/api/admin/applications/:application_id/status",
            put(update_status_handler::<R, M>),
        )
        .route(
            "/api/admin/applications/:application_id/messages",
            post(append_admin_message_handler::<R, M>),
        )
        .with_state(service)
}

/// Body of the review status rewrite endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Body of the applicant-facing message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    pub body: String,
    pub author: String,
}

/// Body of the admin reply endpoint. Any author field in the request is
/// ignored; the service stamps the author itself.
#[derive(Debug, Deserialize)]
pub struct AdminMessagePayload {
    pub body: String,
}

pub(crate) async fn create_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    axum::Json(applicant): axum::Json<ApplicantDetails>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    match service.create(applicant) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "application_id": record.application_id,
                "message": "application submitted successfully",
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    match service.list() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_status(&id, &request.status) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn append_message_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<MessagePayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.append_message(&id, &payload.body, &payload.author) {
        Ok(message) => (StatusCode::CREATED, axum::Json(message)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn append_admin_message_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<AdminMessagePayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.append_admin_message(&id, &payload.body) {
        Ok(message) => (StatusCode::CREATED, axum::Json(message)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_messages_handler<R, M>(
    State(service): State<Arc<CreditApplicationService<R, M>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    M: MessageRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.list_messages(&id) {
        Ok(messages) => (StatusCode::OK, axum::Json(messages)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Identifier(IdentifierError::SpaceExhausted { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ApplicationServiceError::Identifier(IdentifierError::Repository(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ApplicationServiceError::Lifecycle(LifecycleError::InvalidStatusValue { .. }) => {
            StatusCode::BAD_REQUEST
        }
        ApplicationServiceError::Lifecycle(LifecycleError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        ApplicationServiceError::Thread(ThreadError::ApplicationNotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        ApplicationServiceError::Thread(_) => StatusCode::BAD_REQUEST,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
