// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a payload is missing required fields or carries malformed values.
/// The message is meant to be shown to the user as a form error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Board column a task belongs to. Every task has exactly one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Columns in board display order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
        }
    }

    /// Column heading shown on the board.
    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "to-do" => Ok(TaskStatus::Todo),
            "inprogress" | "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "done" | "completed" => Ok(TaskStatus::Done),
            other => Err(ValidationError(format!(
                "Unknown status '{other}' (expected todo, inprogress or done)."
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError(format!(
                "Unknown priority '{other}' (expected high, medium or low)."
            ))),
        }
    }
}

/// Only `Admin` may work with the task board; `Employee` covers every other account.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

#[allow(clippy::doc_overindented_list_items)]
/// Represents a task on the board.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: JSON with camelCase field names
///    (`assignedTo`, `dueDate`), as the dashboard expects them.
/// - `sqlx::FromRow`: built straight from a `tasks` row (snake_case columns).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    pub title: String,

    // Free-text label, not a reference to a user record.
    pub assigned_to: String,

    pub due_date: DateTime<Utc>,

    pub status: TaskStatus,

    pub priority: Priority,
}

/// A stored account. The password field holds the PBKDF2 hash string and
/// is never sent over the wire; use `UserSummary` for that.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Parses a due date given either as RFC 3339 or as a plain `YYYY-MM-DD`
/// day, the latter meaning midnight UTC.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ValidationError(format!(
                "Invalid dueDate '{raw}': expected RFC 3339 or YYYY-MM-DD."
            ))
        })
}

/// Task creation data as received from the API.
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error naming it, instead of a bare decode failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A creation payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub assigned_to: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: Priority,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateTaskPayload {
    /// Checks that all five fields are present and well formed.
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let title = non_blank(self.title);
        let assigned_to = non_blank(self.assigned_to);
        let due_date = non_blank(self.due_date);

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if assigned_to.is_none() {
            missing.push("assignedTo");
        }
        if due_date.is_none() {
            missing.push("dueDate");
        }
        if self.status.is_none() {
            missing.push("status");
        }
        if self.priority.is_none() {
            missing.push("priority");
        }

        match (title, assigned_to, due_date, self.status, self.priority) {
            (Some(title), Some(assigned_to), Some(due_date), Some(status), Some(priority)) => {
                Ok(NewTask {
                    title,
                    assigned_to,
                    due_date: parse_due_date(&due_date)?,
                    status,
                    priority,
                })
            }
            _ => Err(ValidationError(format!(
                "Missing required fields: {}.",
                missing.join(", ")
            ))),
        }
    }
}

/// Partial task update. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl UpdateTaskPayload {
    /// The body a drag-and-drop move sends.
    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Provided text fields must not be blank; a provided date must parse.
    pub fn validate(self) -> Result<TaskPatch, ValidationError> {
        let title = match self.title {
            Some(t) => Some(non_blank(Some(t)).ok_or_else(|| {
                ValidationError("title cannot be empty.".to_string())
            })?),
            None => None,
        };
        let assigned_to = match self.assigned_to {
            Some(a) => Some(non_blank(Some(a)).ok_or_else(|| {
                ValidationError("assignedTo cannot be empty.".to_string())
            })?),
            None => None,
        };
        let due_date = self.due_date.as_deref().map(parse_due_date).transpose()?;

        Ok(TaskPatch {
            title,
            assigned_to,
            due_date,
            status: self.status,
            priority: self.priority,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Reply of `POST /api/auth/login`. Failures carry `success: false` and an
/// `error` message, which is also the shape of every other error body.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply of `GET /api/auth/verify`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Counters shown above the board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(
            TaskStats {
                total: tasks.len(),
                ..TaskStats::default()
            },
            |mut stats, task| {
                match task.status {
                    TaskStatus::Todo => stats.todo += 1,
                    TaskStatus::InProgress => stats.in_progress += 1,
                    TaskStatus::Done => stats.done += 1,
                }
                stats
            },
        )
    }
}
