//! In-memory board projection: the authoritative mirror of persisted state.
//!
//! Per-column rendering lists are derived from this projection and rebuilt
//! after every mutation; they are never the system of record.

use tracing::debug;
use uuid::Uuid;

use crate::types::{Board, StatusColumn, Task};

pub struct BoardState {
    board: Board,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[StatusColumn] {
        &self.board.columns
    }

    /// Positional lookup by column rank, used for focus navigation.
    pub fn column_at(&self, index: usize) -> Option<&StatusColumn> {
        self.board.columns.get(index)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.board.tasks.iter().find(|task| task.id == Some(id))
    }

    pub fn task_count(&self) -> usize {
        self.board.tasks.len()
    }

    /// Tasks belonging to a column, ordered by position. Pure; safe to call
    /// on every render tick.
    pub fn tasks_in_column(&self, column_id: Uuid) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .board
            .tasks
            .iter()
            .filter(|task| task.status_column_id == column_id)
            .collect();
        tasks.sort_by_key(|task| task.position);
        tasks
    }

    /// Caller guarantees the task's column id references a column on this
    /// board.
    pub fn add_task(&mut self, task: Task) {
        self.board.tasks.push(task);
    }

    /// Replaces the task with the matching identifier. A missing identifier
    /// is a logic error upstream; it is ignored here.
    pub fn update_task(&mut self, task: Task) {
        let Some(id) = task.id else {
            debug!("update_task called with a transient task; ignoring");
            return;
        };
        match self.board.tasks.iter_mut().find(|t| t.id == Some(id)) {
            Some(slot) => *slot = task,
            None => debug!(%id, "update_task target not in projection; ignoring"),
        }
    }

    pub fn remove_task(&mut self, id: Uuid) {
        self.board.tasks.retain(|task| task.id != Some(id));
    }
}
