use crate::entities::*;
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::*;
use std::sync::Arc;

pub mod api;
pub mod validation;

use validation::{ValidationErrors, validate_task};

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    name: String,
    description: Option<String>,
    task_date: DateTime<Utc>,
    registered_at: DateTime<Utc>,
    completed: bool,
}

impl Task {
    pub fn new(
        id: i32,
        name: String,
        description: Option<String>,
        task_date: DateTime<Utc>,
        registered_at: DateTime<Utc>,
        completed: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            task_date,
            registered_at,
            completed,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the name of the task.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the task, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the date the task pertains to.
    pub fn task_date(&self) -> DateTime<Utc> {
        self.task_date
    }

    /// Returns when the task was registered.
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns whether the task is completed.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.name,
            model.description,
            model.task_date.with_timezone(&Utc),
            model.registered_at.with_timezone(&Utc),
            model.completed,
        )
    }
}

/// Task fields as received from a client, before validation.
///
/// `id` is ignored on creation and must match the target ID on replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub task_date: Option<DateTime<Utc>>,
    pub registered_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

impl TaskDraft {
    /// Creates a draft with the two required fields set.
    pub fn new(name: impl Into<String>, task_date: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.into()),
            task_date: Some(task_date),
            ..Default::default()
        }
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// One or more fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The payload ID differs from the ID being replaced.
    #[error("Task ID {body_id} in the body does not match ID {path_id} in the path")]
    IdMismatch { path_id: i32, body_id: i32 },
    /// The payload carries no ID while replacing a task.
    #[error("Task body must carry ID {0} to replace it")]
    MissingId(i32),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
    /// Storage updated nothing although the task still exists.
    #[error("Task with ID {0} was modified concurrently")]
    ConcurrencyConflict(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Shared state for the task routes.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<DatabaseConnection>,
}

pub struct TaskService<'a> {
    db: &'a DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Retrieves all tasks in storage order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task`, or `TaskNotFound` when no row has the ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_model = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        Ok(Task::from(task_model))
    }

    /// Validates and inserts a new task. The ID is assigned by the database.
    ///
    /// # Arguments
    ///
    /// * `draft` - The client supplied fields. Its `id` is ignored.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let valid = validate_task(&draft)?;
        let registered_at = valid.registered_at.unwrap_or_else(now);

        let active_model = task::ActiveModel {
            name: ActiveValue::Set(valid.name),
            description: ActiveValue::Set(valid.description),
            task_date: ActiveValue::Set(valid.task_date.into()),
            registered_at: ActiveValue::Set(registered_at.into()),
            completed: ActiveValue::Set(valid.completed),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::debug!("Created task with ID {}", created_model.id);
        Ok(Task::from(created_model))
    }

    /// Replaces every field of an existing task.
    ///
    /// When storage reports that nothing was updated the task's existence is
    /// checked again: a missing row yields `TaskNotFound`, a present one
    /// `ConcurrencyConflict`. Conflicts are not retried.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to replace.
    /// * `draft` - The full replacement. Its `id` must equal `id`.
    #[tracing::instrument(skip(self))]
    pub async fn replace_task(&self, id: i32, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let valid = validate_task(&draft)?;
        match draft.id {
            None => return Err(TaskServiceError::MissingId(id)),
            Some(body_id) if body_id != id => {
                return Err(TaskServiceError::IdMismatch {
                    path_id: id,
                    body_id,
                });
            }
            Some(_) => {}
        }

        let active_model = task::ActiveModel {
            id: ActiveValue::Unchanged(id),
            name: ActiveValue::Set(valid.name),
            description: ActiveValue::Set(valid.description),
            task_date: ActiveValue::Set(valid.task_date.into()),
            registered_at: match valid.registered_at {
                Some(registered_at) => ActiveValue::Set(registered_at.into()),
                None => ActiveValue::NotSet,
            },
            completed: ActiveValue::Set(valid.completed),
        };

        match active_model.update(self.db).await {
            Ok(updated_model) => Ok(Task::from(updated_model)),
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => {
                if self.task_exists(id).await? {
                    tracing::error!("Task {} exists but storage updated nothing", id);
                    Err(TaskServiceError::ConcurrencyConflict(id))
                } else {
                    Err(TaskServiceError::TaskNotFound(id))
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_to_delete = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let task_copy = Task::from(task_to_delete.clone());
        task_to_delete.delete(self.db).await?;
        Ok(task_copy)
    }

    #[tracing::instrument(skip(self))]
    async fn task_exists(&self, id: i32) -> Result<bool, TaskServiceError> {
        let existing_task = task::Entity::find_by_id(id).one(self.db).await?;
        Ok(existing_task.is_some())
    }
}

/// Current time at the precision PostgreSQL stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
