// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::api::TaskApi;
use crate::board::{Action, BoardState, FormField, TaskForm, reduce};
use crate::error::ClientError;
use crate::optimistic::StatusMove;

use common::{Task, TaskStatus, UpdateTaskPayload};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of a drop gesture that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped outside any column, on its own column, or on an unknown task.
    Unchanged,
    /// The server confirmed the new status.
    Committed,
}

/// Drives the board: loads tasks, submits the form, deletes, and moves
/// tasks between columns with an optimistic update.
///
/// The board lock is never held across a server call.
pub struct Dashboard<A> {
    api: A,
    state: Arc<RwLock<BoardState>>,
}

impl<A: TaskApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(BoardState::default())),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// A copy of the current board for rendering.
    pub fn snapshot(&self) -> BoardState {
        self.state.read().clone()
    }

    pub fn dispatch(&self, action: Action) {
        let mut guard = self.state.write();
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, action);
    }

    /// Fetches every task. On failure the board is emptied and shows the error.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.dispatch(Action::LoadStarted);
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!("Loaded {} tasks.", tasks.len());
                self.dispatch(Action::Loaded(tasks));
                Ok(())
            }
            Err(e) => {
                error!("Error fetching tasks: {}", e);
                self.dispatch(Action::LoadFailed(format!("Failed to load tasks: {e}")));
                Err(e)
            }
        }
    }

    pub fn open_create(&self) {
        self.dispatch(Action::OpenCreate);
    }

    pub fn open_edit(&self, id: i64) {
        self.dispatch(Action::OpenEdit(id));
    }

    pub fn edit_field(&self, field: FormField) {
        self.dispatch(Action::EditField(field));
    }

    pub fn reset_form(&self) {
        self.dispatch(Action::ResetForm);
    }

    /// Creates a task, or updates the one being edited, from the form.
    /// The form is validated locally first; on success it is reset.
    pub async fn submit_form(&self) -> Result<Task, ClientError> {
        let (form, editing) = {
            let state = self.state.read();
            (state.form.clone(), state.editing)
        };

        match self.save(&form, editing).await {
            Ok(task) => {
                info!("Saved task {} ({}).", task.id, task.title);
                let action = match editing {
                    Some(_) => Action::TaskReplaced(task.clone()),
                    None => Action::TaskAdded(task.clone()),
                };
                self.dispatch(action);
                self.dispatch(Action::ResetForm);
                Ok(task)
            }
            Err(e) => {
                let verb = if editing.is_some() { "update" } else { "add" };
                error!("Error saving task: {}", e);
                self.dispatch(Action::ErrorRaised(format!("Failed to {verb} task: {e}")));
                Err(e)
            }
        }
    }

    async fn save(&self, form: &TaskForm, editing: Option<i64>) -> Result<Task, ClientError> {
        match editing {
            None => {
                let payload = form.to_create_payload();
                payload.clone().validate()?;
                self.api.create_task(&payload).await
            }
            Some(id) => {
                let payload = form.to_update_payload();
                payload.clone().validate()?;
                self.api.update_task(id, &payload).await
            }
        }
    }

    /// Deletes a task; it leaves the board only once the server confirms.
    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        match self.api.delete_task(id).await {
            Ok(()) => {
                self.dispatch(Action::TaskRemoved(id));
                Ok(())
            }
            Err(e) => {
                error!("Error deleting task {}: {}", id, e);
                self.dispatch(Action::ErrorRaised(format!("Failed to delete task: {e}")));
                Err(e)
            }
        }
    }

    /// Handles a drop of `task_id` onto `destination` (`None` when dropped
    /// outside any column).
    ///
    /// The new status is shown immediately. If the server rejects the
    /// change, or cannot be reached, the task goes back to its prior column
    /// and the error is both returned and shown on the board.
    pub async fn drag_end(
        &self,
        task_id: i64,
        destination: Option<TaskStatus>,
    ) -> Result<DragOutcome, ClientError> {
        let Some(destination) = destination else {
            return Ok(DragOutcome::Unchanged);
        };

        let begun = {
            let state = self.state.read();
            StatusMove::begin(&state, task_id, destination)
        };
        let Some((mut mv, apply)) = begun else {
            return Ok(DragOutcome::Unchanged);
        };

        debug!("Moving task {} from {} to {}.", task_id, mv.from, mv.to);
        self.dispatch(apply);

        match self
            .api
            .update_task(task_id, &UpdateTaskPayload::status_only(destination))
            .await
        {
            Ok(_) => {
                mv.commit();
                info!("Task {} moved to {}.", task_id, destination);
                Ok(DragOutcome::Committed)
            }
            Err(e) => {
                error!("Drag failed for task {}: {}", task_id, e);
                if let Some(revert) = mv.roll_back() {
                    self.dispatch(revert);
                }
                self.dispatch(Action::ErrorRaised(format!("Failed to move task: {e}")));
                Err(e)
            }
        }
    }
}
