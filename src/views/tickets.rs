//! Ticket table of the selected version.

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::Serialize;
use tracing::debug;

use crate::collection::{CollectionView, MatchRule, Scope, SearchSpec, SortKey, SortKeyFn};
use crate::error::{PsaError, Result};
use crate::loader::Loader;
use crate::lookup::Lookups;
use crate::remote::{SupportService, TicketEdit};
use crate::sla::{self, Clock, SlaAllowance, SlaCountdown, SlaStatus};
use crate::types::{EntityId, Ticket, Version};
use crate::utils::sort_millis;

pub const TICKET_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketColumn {
    Id,
    Name,
    Time,
    Customer,
    Kind,
    Severity,
    Status,
    Responsible,
}

enum_display_fromstr!(
    TicketColumn,
    PsaError::invalid_sort_column,
    {
        Id => "id",
        Name => "name",
        Time => "time",
        Customer => "customer",
        Kind => "kind",
        Severity => "severity",
        Status => "status",
        Responsible => "responsible",
    }
);

/// Actions the ticket option panel can open against the selected ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    Edit(TicketEdit),
    Delete,
    Derive { project: EntityId },
}

fn ticket_fields(ticket: &Ticket) -> Vec<&str> {
    vec![ticket.description.as_str()]
}

fn ticket_key(lookups: Arc<Lookups>) -> SortKeyFn<Ticket, TicketColumn> {
    Arc::new(move |ticket: &Ticket, column: TicketColumn| match column {
        TicketColumn::Id => SortKey::Number(ticket.id as f64),
        TicketColumn::Name => SortKey::text(&ticket.name),
        TicketColumn::Time => SortKey::Timestamp(sort_millis(&ticket.time)),
        TicketColumn::Customer => SortKey::text(&lookups.customer_name(ticket.customer)),
        TicketColumn::Kind => SortKey::text(ticket.kind().label()),
        TicketColumn::Severity => SortKey::text(&ticket.severity.name),
        TicketColumn::Status => SortKey::text(&ticket.status.name),
        TicketColumn::Responsible => {
            SortKey::text(&lookups.responsible_name(ticket.responsible))
        }
    })
}

/// A ticket as shown in the table, with ids resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRow {
    pub id: EntityId,
    pub title: String,
    pub opened: String,
    pub customer: String,
    pub kind: String,
    /// Empty for inquiries.
    pub severity: String,
    pub status: String,
    pub responsible: String,
}

/// Static text of the ticket detail panel at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketDetail {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub version: String,
    pub customer: String,
    pub responsible: String,
    pub status: String,
    pub kind: String,
    /// "Tiempo según severidad: N días", absent for inquiries.
    pub allowance: Option<String>,
    /// Countdown line, or the inquiry message.
    pub remaining: String,
    pub overdue: bool,
    /// "Fecha de finalizacion: ...", absent for inquiries.
    pub due: Option<String>,
}

pub struct TicketBoard {
    pub(crate) view: CollectionView<Ticket, TicketColumn, TicketAction>,
    pub(crate) lookups: Arc<Lookups>,
    version: Option<Version>,
    loader: Loader<EntityId>,
}

impl TicketBoard {
    pub fn new(lookups: Lookups) -> Self {
        let lookups = Arc::new(lookups);
        Self {
            view: CollectionView::new(
                SearchSpec::new(MatchRule::Contains, ticket_fields),
                ticket_key(Arc::clone(&lookups)),
                Some(TICKET_PAGE_SIZE),
            ),
            lookups,
            version: None,
            loader: Loader::new(),
        }
    }

    pub fn view(&self) -> &CollectionView<Ticket, TicketColumn, TicketAction> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CollectionView<Ticket, TicketColumn, TicketAction> {
        &mut self.view
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Scope the table to `version`. Tickets of other versions stay loaded
    /// but hidden.
    pub fn set_version(&mut self, version: Version) {
        let version_id = version.id;
        let scope: Scope<Ticket> = Arc::new(move |ticket: &Ticket| ticket.version.id == version_id);
        self.version = Some(version);
        self.view.selection_mut().clear();
        self.view.set_scope(Some(scope));
    }

    /// Fetch the tickets of the selected version.
    ///
    /// A load started for a version that is no longer selected is discarded.
    pub async fn load(&mut self, service: Arc<dyn SupportService>) -> Result<()> {
        let version_id = self
            .version
            .as_ref()
            .map(|v| v.id)
            .ok_or_else(|| PsaError::MissingPrecondition("no version selected".to_string()))?;

        self.view.begin_load();
        let pending = self
            .loader
            .spawn(version_id, async move { service.version_tickets(version_id).await });
        let outcome = pending.finish().await;
        if let Ok(tickets) = &outcome {
            debug!(version = version_id, total = tickets.len(), "tickets loaded");
        }
        self.view.finish_load(outcome)
    }

    pub fn row(&self, ticket: &Ticket) -> TicketRow {
        let kind = ticket.kind();
        TicketRow {
            id: ticket.id,
            title: ticket.name.clone(),
            opened: ticket.opened_label(),
            customer: self.lookups.customer_name(ticket.customer),
            kind: kind.label().to_string(),
            severity: if ticket.severity.is_inquiry() {
                String::new()
            } else {
                ticket.severity.name.clone()
            },
            status: ticket.status.name.clone(),
            responsible: self.lookups.responsible_name(ticket.responsible),
        }
    }

    /// Rows of the current page.
    pub fn rows(&self) -> Vec<TicketRow> {
        self.view.page_rows().iter().map(|t| self.row(t)).collect()
    }

    pub fn select(&mut self, id: EntityId) -> Result<&Ticket> {
        self.view.select(id)
    }

    pub fn selected(&self) -> Result<&Ticket> {
        self.view
            .selected()
            .ok_or_else(|| PsaError::MissingPrecondition("no ticket selected".to_string()))
    }

    /// Detail text for ticket `id` as of `now`.
    pub fn detail(&self, id: EntityId, now: Timestamp, tz: &TimeZone) -> Result<TicketDetail> {
        let ticket = self
            .view
            .get(id)
            .ok_or_else(|| PsaError::NotFound(format!("ticket {id}")))?;
        let status = sla::sla_status(ticket, now, tz)?;
        let overdue = matches!(status, SlaStatus::Remaining { overdue: true, .. });

        Ok(TicketDetail {
            id: ticket.id,
            title: ticket.name.clone(),
            description: ticket.description.clone(),
            version: ticket.version.label(),
            customer: self.lookups.customer_name(ticket.customer),
            responsible: self.lookups.responsible_name(ticket.responsible),
            status: ticket.status.name.clone(),
            kind: ticket.kind().label().to_string(),
            allowance: SlaAllowance::for_ticket(ticket).map(|a| a.label()),
            remaining: status.to_string(),
            overdue,
            due: sla::due_date_label(ticket)?,
        })
    }

    /// Select ticket `id` and open its detail panel with a live countdown.
    pub fn open_detail(
        &mut self,
        id: EntityId,
        tz: TimeZone,
        clock: Clock,
        period: Duration,
    ) -> Result<TicketDetailPanel> {
        let ticket = self.view.select(id)?.clone();
        let detail = self.detail(id, clock(), &tz)?;
        let countdown = SlaCountdown::start(ticket, tz, clock, period);
        Ok(TicketDetailPanel { detail, countdown })
    }
}

/// An open detail panel. Dropping it stops the countdown.
pub struct TicketDetailPanel {
    pub detail: TicketDetail,
    pub countdown: SlaCountdown,
}

impl TicketDetailPanel {
    pub fn close(self) {
        self.countdown.stop();
    }
}
