// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database;
use crate::error::AppError;

use axum::{
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use common::{CreateTaskPayload, Task, UpdateTaskPayload};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Liveness probe for `GET /`.
pub async fn health() -> &'static str {
    "Your server works fine!"
}

/// Handler for listing every task.
pub async fn list_tasks(
    State(pool): State<SqlitePool>, // State injection (DB pool)
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = database::get_all_tasks_from_db(&pool).await?;
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// Handler for creating a new task.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreateTaskPayload>, JsonRejection>, // Extracting the request body as JSON
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(payload) = payload?;
    debug!("Received request to create task: {:?}", payload.title);

    let new_task = payload.validate().inspect_err(|e| {
        error!("Validation failed: {}", e);
    })?;

    let created = database::create_task_in_db(&pool, new_task).await?;

    info!("Task created successfully with ID: {}", created.id);

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for a partial update of a task by ID.
pub async fn update_task(
    State(pool): State<SqlitePool>,
    task_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskPayload>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Path(task_id) = task_id?;
    let Json(payload) = payload?;
    debug!("Attempting to update task with ID: {}", task_id);

    let patch = payload.validate()?;

    match database::update_task_in_db(&pool, task_id, patch).await? {
        Some(task) => {
            info!("Task with ID {} updated successfully.", task_id);
            Ok(Json(task))
        }
        None => {
            error!("Task with ID {} not found for update.", task_id);
            Err(AppError::not_found(&format!(
                "Task with ID {task_id} not found."
            )))
        }
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    task_id: Result<Path<i64>, PathRejection>, // Extract task ID from the URL path
) -> Result<StatusCode, AppError> {
    let Path(task_id) = task_id?;
    debug!("Attempting to delete task with ID: {}", task_id);

    if database::delete_task_from_db(&pool, task_id).await? {
        info!("Task with ID {} deleted successfully.", task_id);
        Ok(StatusCode::NO_CONTENT) // 204 No Content for successful deletion
    } else {
        error!("Task with ID {} not found for deletion.", task_id);
        Err(AppError::not_found(&format!(
            "Task with ID {task_id} not found."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::setup_test_db;
    use common::{Priority, TaskStatus};

    // Helper to create a payload for tests
    fn create_test_payload(title: &str, assigned_to: &str) -> Json<CreateTaskPayload> {
        Json(CreateTaskPayload {
            title: Some(title.to_string()),
            assigned_to: Some(assigned_to.to_string()),
            due_date: Some("2024-01-01".to_string()),
            status: Some(TaskStatus::Todo),
            priority: Some(Priority::High),
        })
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_title() {
        // Validation fails before any DB access.
        let pool = setup_test_db().await.unwrap();
        let payload = create_test_payload("", "Alice");

        let result = create_task(State(pool), Ok(payload)).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields: title.");
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let pool = setup_test_db().await.unwrap();

        let (status, Json(created)) =
            create_task(State(pool.clone()), Ok(create_test_payload("Write report", "Alice")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(tasks) = list_tasks(State(pool)).await.unwrap();
        assert_eq!(tasks, vec![created]);
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        let pool = setup_test_db().await.unwrap();

        let err = update_task(
            State(pool),
            Ok(Path(99)),
            Ok(Json(UpdateTaskPayload::status_only(TaskStatus::Done))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Task with ID 99 not found.");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_assignee() {
        let pool = setup_test_db().await.unwrap();
        let (_, Json(created)) =
            create_task(State(pool.clone()), Ok(create_test_payload("Plan", "Bob")))
                .await
                .unwrap();

        let payload = UpdateTaskPayload {
            assigned_to: Some("  ".to_string()),
            ..UpdateTaskPayload::default()
        };
        let err = update_task(State(pool), Ok(Path(created.id)), Ok(Json(payload)))
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let pool = setup_test_db().await.unwrap();
        let (_, Json(created)) =
            create_task(State(pool.clone()), Ok(create_test_payload("Once", "Carol")))
                .await
                .unwrap();

        assert_eq!(
            delete_task(State(pool.clone()), Ok(Path(created.id))).await.unwrap(),
            StatusCode::NO_CONTENT
        );
        let err = delete_task(State(pool), Ok(Path(created.id))).await.unwrap_err();
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }
}
