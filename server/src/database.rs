// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::{NewTask, Role, Task, TaskPatch, User};
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use std::path::Path;
use tracing::{debug, info};

const TASK_COLUMNS: &str = "id, title, assigned_to, due_date, status, priority";
const USER_COLUMNS: &str = "id, username, email, password, role";

/// Establishes the database connection pool.
/// If the database (or the directory holding it) does not exist, it is created.
/// The schema is then brought up to date.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if let Some(parent) = database_file_parent(database_url) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Directory part of a file-backed SQLite URL, `None` for in-memory databases.
fn database_file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path).parent()
}

/// Creates the `tasks`, `users` and `sessions` tables if they are missing.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            assigned_to TEXT NOT NULL,
            due_date TIMESTAMP NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('todo', 'inprogress', 'done')),
            priority TEXT NOT NULL CHECK (priority IN ('high', 'medium', 'low'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('admin', 'employee'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'users' table")?;

    // Expiry is kept as a unix timestamp so the comparison stays numeric.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'sessions' table")?;

    info!("'tasks', 'users' and 'sessions' tables are ready.");

    Ok(())
}

/// Retrieves every task in insertion order.
pub async fn get_all_tasks_from_db(pool: &SqlitePool) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC;"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to retrieve tasks from DB")?;

    Ok(tasks)
}

/// Inserts a new task and returns it with its generated id.
pub async fn create_task_in_db(pool: &SqlitePool, task: NewTask) -> Result<Task> {
    debug!(
        "Insert values: title={}, assigned_to={}, due_date={}, status={}, priority={}",
        task.title, task.assigned_to, task.due_date, task.status, task.priority
    );

    let created = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, assigned_to, due_date, status, priority) VALUES (?, ?, ?, ?, ?) RETURNING {TASK_COLUMNS}"
    ))
    .bind(&task.title)
    .bind(&task.assigned_to)
    .bind(task.due_date)
    .bind(task.status)
    .bind(task.priority)
    .fetch_one(pool)
    .await
    .context("Failed to insert task into DB")?;

    Ok(created)
}

/// Merges the provided fields into the task in a single statement.
/// Returns `None` if no task with the given ID exists.
pub async fn update_task_in_db(
    pool: &SqlitePool,
    task_id: i64,
    patch: TaskPatch,
) -> Result<Option<Task>> {
    debug!("Attempting to update task with ID: {} ({:?})", task_id, patch);

    let updated = sqlx::query_as::<_, Task>(&format!(
        r#"
        UPDATE tasks SET
            title = COALESCE(?, title),
            assigned_to = COALESCE(?, assigned_to),
            due_date = COALESCE(?, due_date),
            status = COALESCE(?, status),
            priority = COALESCE(?, priority)
        WHERE id = ?
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(patch.title)
    .bind(patch.assigned_to)
    .bind(patch.due_date)
    .bind(patch.status)
    .bind(patch.priority)
    .bind(task_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to update task with ID: {task_id}"))?;

    Ok(updated)
}

/// Deletes a task by ID.
/// Returns true if a row was removed, false if no task with the given ID was found.
pub async fn delete_task_from_db(pool: &SqlitePool, task_id: i64) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete task with ID: {task_id}"))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}

/// Inserts a user. The email is stored lower-cased and must be unique.
pub async fn create_user_in_db(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let email = email.trim().to_lowercase();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(&email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to insert user {email} into DB"))?;

    info!("Created user {} with ID: {}", user.email, user.id);
    Ok(user)
}

pub async fn find_user_by_email_in_db(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await
    .context("Failed to look up user by email")?;

    Ok(user)
}

/// Records a session for `user_id`, keyed by the hash of its bearer token.
pub async fn create_session_in_db(
    pool: &SqlitePool,
    token_hash: &str,
    user_id: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(created_at.timestamp())
    .bind(expires_at.timestamp())
    .execute(pool)
    .await
    .context("Failed to insert session into DB")?;

    Ok(())
}

/// Returns the owner of a session that has not expired at `now`.
pub async fn find_session_user_in_db(
    pool: &SqlitePool,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.password, u.role
        FROM sessions s JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = ? AND s.expires_at > ?
        "#,
    )
    .bind(token_hash)
    .bind(now.timestamp())
    .fetch_optional(pool)
    .await
    .context("Failed to look up session")?;

    Ok(user)
}

/// Revokes a session. Returns false if it did not exist.
pub async fn delete_session_from_db(pool: &SqlitePool, token_hash: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await
        .context("Failed to delete session")?;

    Ok(result.rows_affected() > 0)
}

/// Removes every session that expired at or before `now`.
pub async fn purge_expired_sessions_in_db(pool: &SqlitePool, now: DateTime<Utc>) -> Result<usize> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now.timestamp())
        .execute(pool)
        .await
        .context("Failed to purge expired sessions")?;

    let purged = result.rows_affected() as usize;
    debug!("Purged {} expired sessions.", purged);
    Ok(purged)
}
