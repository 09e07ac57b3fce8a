//! The task option panel: status change, reassignment and deletion.

use tracing::{info, warn};

use super::projects::{ProjectBoard, TaskAction};
use crate::dispatch::{self, Reconciled};
use crate::error::{PsaError, Result};
use crate::remote::{ProjectService, TaskEdit, TaskReplacement};
use crate::types::EntityId;

pub struct TaskPanel<'a> {
    board: &'a mut ProjectBoard,
    service: &'a dyn ProjectService,
}

impl<'a> TaskPanel<'a> {
    pub fn new(board: &'a mut ProjectBoard, service: &'a dyn ProjectService) -> Self {
        Self { board, service }
    }

    pub fn board(&self) -> &ProjectBoard {
        &*self.board
    }

    pub fn open(&mut self, id: EntityId, action: TaskAction) -> Result<()> {
        if self.board.tasks.selection().id() != Some(id) {
            self.board.tasks.select(id)?;
        }
        self.board.tasks.selection_mut().open(action)?;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.board.tasks.selection_mut().cancel();
    }

    pub async fn submit(&mut self) -> Result<Reconciled> {
        let action = self
            .board
            .tasks
            .selection()
            .modal()
            .map(|modal| modal.action.clone())
            .ok_or_else(|| PsaError::MissingPrecondition("no action is open".to_string()))?;
        let id = self.board.tasks.selection_mut().begin_submit()?;

        let outcome = self.send(id, action).await;
        self.board.tasks.selection_mut().finish();
        if let Err(e) = &outcome {
            warn!(task = id, error = %e, "task action failed");
        }
        outcome
    }

    async fn send(&mut self, id: EntityId, action: TaskAction) -> Result<Reconciled> {
        let service = self.service;
        let tasks = &mut self.board.tasks;
        match action {
            TaskAction::Edit(edit) => {
                let patch = edit.to_patch();
                let reconciled = dispatch::apply_update(
                    tasks,
                    id,
                    service.patch_task(id, &patch),
                    || service.tasks(),
                )
                .await?;
                info!(task = id, ?reconciled, "task status updated");
                Ok(reconciled)
            }
            TaskAction::Assign(assignee) => {
                let current = tasks
                    .get(id)
                    .ok_or_else(|| PsaError::NotFound(format!("task {id}")))?;
                let mut body = TaskReplacement::from_task(current);
                body.assignee = Some(assignee);
                let reconciled = dispatch::apply_update(
                    tasks,
                    id,
                    service.replace_task(id, &body),
                    || service.tasks(),
                )
                .await?;
                info!(task = id, ?reconciled, "task reassigned");
                Ok(reconciled)
            }
            TaskAction::Delete => dispatch::apply_delete(tasks, id, service.delete_task(id)).await,
        }
    }

    async fn run(&mut self, id: EntityId, action: TaskAction) -> Result<Reconciled> {
        self.open(id, action)?;
        self.submit().await
    }

    /// Change the task status to one of the offered status options.
    pub async fn set_status(&mut self, id: EntityId, status: EntityId) -> Result<Reconciled> {
        if !self.board.status_options().iter().any(|s| s.id == status) {
            return Err(PsaError::NotFound(format!("status {status}")));
        }
        self.run(id, TaskAction::Edit(TaskEdit::Status(status))).await
    }

    /// Replace the assignee; every other field is sent back unchanged.
    pub async fn assign(&mut self, id: EntityId, assignee: &str) -> Result<Reconciled> {
        let assignee = assignee.trim();
        if assignee.is_empty() {
            return Err(PsaError::MissingPrecondition(
                "assignee cannot be empty".to_string(),
            ));
        }
        self.run(id, TaskAction::Assign(assignee.to_string())).await
    }

    pub async fn delete(&mut self, id: EntityId) -> Result<Reconciled> {
        self.run(id, TaskAction::Delete).await
    }
}
