use crate::task::{Task, TaskDraft, TaskService, TaskServiceError, TaskState};
use crate::web::api::ErrorResponse;
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Unique identifier assigned on creation
    pub id: i32,
    /// Name of the task, at most 150 characters
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Date the task pertains to
    pub task_date: DateTime<Utc>,
    /// When the task was registered
    pub registered_at: DateTime<Utc>,
    /// Whether the task is completed
    pub completed: bool,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            name: task.name().to_string(),
            description: task.description().map(str::to_string),
            task_date: task.task_date(),
            registered_at: task.registered_at(),
            completed: task.completed(),
        }
    }
}

/// Request body for creating or replacing a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    /// Ignored on creation, must match the path ID on replacement
    pub id: Option<i32>,
    /// Name of the task, required, at most 150 characters
    pub name: Option<String>,
    /// Optional free-form description
    pub description: Option<String>,
    /// Date the task pertains to, required
    pub task_date: Option<DateTime<Utc>>,
    /// Registration time, defaults to now on creation
    pub registered_at: Option<DateTime<Utc>>,
    /// Whether the task is completed
    #[serde(default)]
    pub completed: bool,
}

impl From<TaskPayload> for TaskDraft {
    fn from(payload: TaskPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            description: payload.description,
            task_date: payload.task_date,
            registered_at: payload.registered_at,
            completed: payload.completed,
        }
    }
}

/// Error type for the task JSON handlers.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    #[error(transparent)]
    Service(#[from] TaskServiceError),
    /// The body is not valid JSON for a task.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    /// The path segment is not a task ID.
    #[error("Invalid task ID: {0}")]
    InvalidId(#[from] PathRejection),
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            TaskApiError::Service(TaskServiceError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_error", "One or more validation errors occurred.")
                    .with_fields(errors.fields().clone()),
            ),
            TaskApiError::Service(
                TaskServiceError::IdMismatch { .. } | TaskServiceError::MissingId(_),
            ) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("id_mismatch", self.to_string()),
            ),
            TaskApiError::Service(TaskServiceError::TaskNotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", self.to_string()),
            ),
            TaskApiError::Service(
                TaskServiceError::ConcurrencyConflict(_) | TaskServiceError::Database(_),
            ) => {
                tracing::error!("Task request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "internal_error",
                        "An unexpected error occurred while processing your request. Please try again later.",
                    ),
                )
            }
            TaskApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("invalid_body", rejection.body_text()),
            ),
            TaskApiError::InvalidId(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("invalid_id", rejection.body_text()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler for GET /api/tasks - Returns every task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let tasks = TaskService::new(&state.db).get_all_tasks().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /api/tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Successfully retrieved the task", body = TaskJson),
        (status = 400, description = "The ID is not an integer", body = ErrorResponse),
        (status = 404, description = "No task has the given ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = id?;
    let task = TaskService::new(&state.db).get_task_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /api/tasks - Creates a task and returns it with its location.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = TaskJson,
            headers(("location" = String, description = "URL of the created task"))),
        (status = 400, description = "The task is invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<TaskJson>), TaskApiError> {
    let Json(payload) = payload?;
    let task = TaskService::new(&state.db)
        .create_task(TaskDraft::from(payload))
        .await?;
    let location = format!("/api/tasks/{}", task.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskJson::from(task)),
    ))
}

/// Handler for PUT /api/tasks/{id} - Replaces every field of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = TaskPayload,
    responses(
        (status = 204, description = "Task replaced"),
        (status = 400, description = "The task is invalid or its ID differs from the path", body = ErrorResponse),
        (status = 404, description = "No task has the given ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn replace_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<StatusCode, TaskApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    TaskService::new(&state.db)
        .replace_task(id, TaskDraft::from(payload))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /api/tasks/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 400, description = "The ID is not an integer", body = ErrorResponse),
        (status = 404, description = "No task has the given ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, TaskApiError> {
    let Path(id) = id?;
    TaskService::new(&state.db).delete_task_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(replace_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
