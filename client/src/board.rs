// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Board state container.
//!
//! All UI state lives in `BoardState` and only changes through `reduce`,
//! a pure function of the previous state and an `Action`. Rendering and
//! network code read snapshots and dispatch actions; they never mutate
//! the state directly.
use common::{CreateTaskPayload, Priority, Task, TaskStats, TaskStatus, UpdateTaskPayload};

/// Contents of the add/edit task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub assigned_to: String,
    /// Kept as typed; parsed when the payload is validated.
    pub due_date: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            assigned_to: String::new(),
            due_date: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
        }
    }
}

impl TaskForm {
    /// Prefills the form for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            assigned_to: task.assigned_to.clone(),
            due_date: task.due_date.to_rfc3339(),
            status: task.status,
            priority: task.priority,
        }
    }

    pub fn to_create_payload(&self) -> CreateTaskPayload {
        CreateTaskPayload {
            title: Some(self.title.clone()),
            assigned_to: Some(self.assigned_to.clone()),
            due_date: Some(self.due_date.clone()),
            status: Some(self.status),
            priority: Some(self.priority),
        }
    }

    /// An edit sends every field of the form.
    pub fn to_update_payload(&self) -> UpdateTaskPayload {
        UpdateTaskPayload {
            title: Some(self.title.clone()),
            assigned_to: Some(self.assigned_to.clone()),
            due_date: Some(self.due_date.clone()),
            status: Some(self.status),
            priority: Some(self.priority),
        }
    }
}

/// A single form field edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Title(String),
    AssignedTo(String),
    DueDate(String),
    Status(TaskStatus),
    Priority(Priority),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    /// Last error to show to the user.
    pub error: Option<String>,
    pub form: TaskForm,
    /// Id of the task the form is editing; `None` when adding.
    pub editing: Option<i64>,
    pub show_modal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadStarted,
    Loaded(Vec<Task>),
    LoadFailed(String),
    OpenCreate,
    OpenEdit(i64),
    EditField(FormField),
    ResetForm,
    TaskAdded(Task),
    TaskReplaced(Task),
    TaskRemoved(i64),
    /// Unconditionally sets a task's status (the optimistic move).
    StatusSet { id: i64, status: TaskStatus },
    /// Restores `restore` only while the task still shows `expected`.
    StatusReverted {
        id: i64,
        expected: TaskStatus,
        restore: TaskStatus,
    },
    ErrorRaised(String),
    ErrorDismissed,
}

/// Applies one action to the state.
pub fn reduce(mut state: BoardState, action: Action) -> BoardState {
    match action {
        Action::LoadStarted => {
            state.loading = true;
        }
        Action::Loaded(tasks) => {
            state.tasks = tasks;
            state.loading = false;
            state.error = None;
        }
        Action::LoadFailed(message) => {
            state.tasks.clear();
            state.loading = false;
            state.error = Some(message);
        }
        Action::OpenCreate => {
            state.form = TaskForm::default();
            state.editing = None;
            state.show_modal = true;
        }
        Action::OpenEdit(id) => {
            // Unknown ids leave the state untouched.
            if let Some(task) = state.tasks.iter().find(|t| t.id == id) {
                state.form = TaskForm::from_task(task);
                state.editing = Some(id);
                state.show_modal = true;
            }
        }
        Action::EditField(field) => match field {
            FormField::Title(v) => state.form.title = v,
            FormField::AssignedTo(v) => state.form.assigned_to = v,
            FormField::DueDate(v) => state.form.due_date = v,
            FormField::Status(v) => state.form.status = v,
            FormField::Priority(v) => state.form.priority = v,
        },
        Action::ResetForm => {
            state.form = TaskForm::default();
            state.editing = None;
            state.show_modal = false;
        }
        Action::TaskAdded(task) => {
            state.tasks.push(task);
        }
        Action::TaskReplaced(task) => {
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
            }
        }
        Action::TaskRemoved(id) => {
            state.tasks.retain(|t| t.id != id);
        }
        Action::StatusSet { id, status } => {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                task.status = status;
            }
        }
        Action::StatusReverted {
            id,
            expected,
            restore,
        } => {
            if let Some(task) = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id && t.status == expected)
            {
                task.status = restore;
            }
        }
        Action::ErrorRaised(message) => {
            state.error = Some(message);
        }
        Action::ErrorDismissed => {
            state.error = None;
        }
    }
    state
}

impl BoardState {
    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of one column, in display order.
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }
}
