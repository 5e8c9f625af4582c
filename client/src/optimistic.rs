// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::board::{Action, BoardState};

use common::TaskStatus;

/// Lifecycle of one optimistic mutation. `Committed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

/// An optimistic column change of one task.
///
/// The prior status is captured when the move starts, so a failed server
/// call can put the task back where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMove {
    pub task_id: i64,
    pub from: TaskStatus,
    pub to: TaskStatus,
    state: MutationState,
}

impl StatusMove {
    /// Starts a move and returns it with the action applying it locally.
    /// Returns `None` when there is nothing to do: unknown task, or the
    /// task already sits in the destination column.
    pub fn begin(board: &BoardState, task_id: i64, to: TaskStatus) -> Option<(Self, Action)> {
        let from = board.task(task_id)?.status;
        if from == to {
            return None;
        }
        let mv = Self {
            task_id,
            from,
            to,
            state: MutationState::Pending,
        };
        Some((mv, Action::StatusSet { id: task_id, status: to }))
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    /// The server accepted the change; the local state already matches.
    /// Returns false if the move was no longer pending.
    pub fn commit(&mut self) -> bool {
        if self.state != MutationState::Pending {
            return false;
        }
        self.state = MutationState::Committed;
        true
    }

    /// The server call failed: returns the action restoring the prior status.
    /// The revert only applies while the task still shows the optimistic
    /// value, so it cannot undo a later move. `None` if no longer pending.
    pub fn roll_back(&mut self) -> Option<Action> {
        if self.state != MutationState::Pending {
            return None;
        }
        self.state = MutationState::RolledBack;
        Some(Action::StatusReverted {
            id: self.task_id,
            expected: self.to,
            restore: self.from,
        })
    }
}
