use std::collections::BTreeMap;
use std::sync::Arc;

use crate::task::{self, TaskState};

use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON response for API errors
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error kind
    pub error: String,
    /// Human readable description
    pub message: String,
    /// Validation messages grouped by field, present only for validation errors
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attaches per-field validation messages.
    pub fn with_fields(mut self, fields: BTreeMap<String, Vec<String>>) -> Self {
        self.fields = fields;
        self
    }
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    let tasks_router = task::api::create_api_router(task_state);
    Router::new().nest("/api", tasks_router)
}
