//! The ticket option panel: one modal action at a time against the selected
//! ticket.
//!
//! Every action follows the same path: select the row, open the action,
//! validate it against the reference data, submit, reconcile. The request
//! always goes out before the board changes.

use tracing::{info, warn};

use super::tickets::{TicketAction, TicketBoard};
use crate::dispatch::{self, Reconciled};
use crate::error::{PsaError, Result};
use crate::remote::{Echo, SupportService, TicketEdit};
use crate::types::{EntityId, Ticket, TicketKind};

pub struct TicketPanel<'a> {
    board: &'a mut TicketBoard,
    service: &'a dyn SupportService,
}

impl<'a> TicketPanel<'a> {
    pub fn new(board: &'a mut TicketBoard, service: &'a dyn SupportService) -> Self {
        Self { board, service }
    }

    pub fn board(&self) -> &TicketBoard {
        &*self.board
    }

    /// Open `action` against ticket `id` without sending anything.
    pub fn open(&mut self, id: EntityId, action: TicketAction) -> Result<()> {
        if self.board.view.selection().id() != Some(id) {
            self.board.view.select(id)?;
        }
        self.board.view.selection_mut().open(action)?;
        Ok(())
    }

    /// Close the open modal; the ticket stays selected.
    pub fn cancel(&mut self) {
        self.board.view.selection_mut().cancel();
    }

    /// Send the open action. The modal closes whether or not it succeeded.
    pub async fn submit(&mut self) -> Result<Reconciled> {
        let action = self
            .board
            .view
            .selection()
            .modal()
            .map(|modal| modal.action.clone())
            .ok_or_else(|| PsaError::MissingPrecondition("no action is open".to_string()))?;
        let id = self.board.view.selection_mut().begin_submit()?;

        let outcome = self.send(id, action).await;
        self.board.view.selection_mut().finish();
        if let Err(e) = &outcome {
            warn!(ticket = id, error = %e, "ticket action failed");
        }
        outcome
    }

    async fn send(&mut self, id: EntityId, action: TicketAction) -> Result<Reconciled> {
        let service = self.service;
        let view = &mut self.board.view;
        match action {
            TicketAction::Edit(edit) => {
                let patch = edit.to_patch();
                let reconciled = dispatch::apply_update(
                    view,
                    id,
                    service.patch_ticket(id, &patch),
                    || service.tickets(),
                )
                .await?;
                info!(ticket = id, field = edit.field(), ?reconciled, "ticket updated");
                Ok(reconciled)
            }
            TicketAction::Delete => {
                dispatch::apply_delete(view, id, service.delete_ticket(id)).await
            }
            TicketAction::Derive { project } => {
                service.derive_ticket(id, project).await?;
                info!(ticket = id, project, "ticket derived to project");
                dispatch::reconcile(view, id, Echo::Accepted, || service.tickets()).await
            }
        }
    }

    async fn run(&mut self, id: EntityId, action: TicketAction) -> Result<Reconciled> {
        self.open(id, action)?;
        self.submit().await
    }

    fn ticket(&self, id: EntityId) -> Result<&Ticket> {
        self.board
            .view
            .get(id)
            .ok_or_else(|| PsaError::NotFound(format!("ticket {id}")))
    }

    pub async fn set_status(&mut self, id: EntityId, status: EntityId) -> Result<Reconciled> {
        if self.board.lookups.status(status).is_none() {
            return Err(PsaError::NotFound(format!("status {status}")));
        }
        self.run(id, TicketAction::Edit(TicketEdit::Status(status)))
            .await
    }

    /// Reassign the ticket to a customer of its version.
    pub async fn set_customer(&mut self, id: EntityId, customer: EntityId) -> Result<Reconciled> {
        let known = self
            .board
            .lookups
            .version_customers
            .iter()
            .chain(self.board.lookups.customers.iter())
            .any(|c| c.id == customer);
        if !known {
            return Err(PsaError::NotFound(format!("customer {customer}")));
        }
        self.run(id, TicketAction::Edit(TicketEdit::Customer(customer)))
            .await
    }

    pub async fn set_responsible(
        &mut self,
        id: EntityId,
        responsible: EntityId,
    ) -> Result<Reconciled> {
        if self.board.lookups.responsible(responsible).is_none() {
            return Err(PsaError::NotFound(format!("responsible {responsible}")));
        }
        self.run(id, TicketAction::Edit(TicketEdit::Responsible(responsible)))
            .await
    }

    pub async fn remove_responsible(&mut self, id: EntityId) -> Result<Reconciled> {
        if self.ticket(id)?.responsible.is_none() {
            return Err(PsaError::MissingPrecondition(format!(
                "ticket {id} has no responsible"
            )));
        }
        self.run(id, TicketAction::Edit(TicketEdit::RemoveResponsible))
            .await
    }

    pub async fn rename(&mut self, id: EntityId, title: &str) -> Result<Reconciled> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PsaError::MissingPrecondition(
                "ticket title cannot be empty".to_string(),
            ));
        }
        self.run(id, TicketAction::Edit(TicketEdit::Name(title.to_string())))
            .await
    }

    pub async fn describe(&mut self, id: EntityId, description: &str) -> Result<Reconciled> {
        self.run(
            id,
            TicketAction::Edit(TicketEdit::Description(description.to_string())),
        )
        .await
    }

    /// Change the ticket type and severity.
    ///
    /// Inquiries point at the "NA" severity row (id 0 when the service has
    /// none). Error tickets need one of the SLA severities.
    pub async fn set_severity(
        &mut self,
        id: EntityId,
        kind: TicketKind,
        severity: Option<EntityId>,
    ) -> Result<Reconciled> {
        let severity_id = match kind {
            TicketKind::Inquiry => self
                .board
                .lookups
                .inquiry_severity()
                .map(|s| s.id)
                .unwrap_or(0),
            TicketKind::Error => {
                let wanted = severity.ok_or_else(|| {
                    PsaError::MissingPrecondition(
                        "error tickets need a severity".to_string(),
                    )
                })?;
                self.board
                    .lookups
                    .error_severities()
                    .find(|s| s.id == wanted)
                    .map(|s| s.id)
                    .ok_or_else(|| PsaError::NotFound(format!("severity {wanted}")))?
            }
        };
        self.run(id, TicketAction::Edit(TicketEdit::Severity(severity_id)))
            .await
    }

    /// Move the ticket to another version. Its customer must be attached to
    /// the target version.
    pub async fn move_version(&mut self, id: EntityId, version: EntityId) -> Result<Reconciled> {
        if self.board.lookups.version(version).is_none() {
            return Err(PsaError::NotFound(format!("version {version}")));
        }
        let customer = self.ticket(id)?.customer;
        let customers = self.service.version_customers(version).await?;
        if !customers.iter().any(|c| c.id == customer) {
            return Err(PsaError::MissingPrecondition(format!(
                "customer {customer} does not have version {version}"
            )));
        }
        self.run(id, TicketAction::Edit(TicketEdit::Version(version)))
            .await
    }

    pub async fn delete(&mut self, id: EntityId) -> Result<Reconciled> {
        self.run(id, TicketAction::Delete).await
    }

    /// Link the ticket to project `project` as a task.
    pub async fn derive(&mut self, id: EntityId, project: EntityId) -> Result<Reconciled> {
        self.run(id, TicketAction::Derive { project }).await
    }
}
