//! Creation forms for tickets, tasks and projects.

use std::sync::Arc;

use tracing::{debug, info};

use super::projects::ProjectBoard;
use super::tickets::TicketBoard;
use crate::collection::MatchRule;
use crate::debounce::{Debounced, Debouncer};
use crate::dispatch::{self, Reconciled};
use crate::error::{PsaError, Result};
use crate::lookup::{search_customers, search_responsibles};
use crate::remote::{NewTicket, NewWorkItem, ProjectService, SupportService};
use crate::session::SessionContext;
use crate::types::{Customer, EntityId, Responsible, Severity, TicketKind, Version};
use crate::utils::format_api_datetime;

/// Longest title or name the forms accept.
pub const MAX_NAME_CHARS: usize = 255;

fn required_name(raw: &str, what: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PsaError::MissingPrecondition(format!("{what} cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(PsaError::MissingPrecondition(format!(
            "{what} is longer than {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Option lists the ticket form picks from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftOptions {
    pub customers: Vec<Customer>,
    pub responsibles: Vec<Responsible>,
    pub severities: Vec<Severity>,
}

/// The ticket creation form, bound to the session's version.
pub struct TicketDraft {
    version: Version,
    pub name: String,
    pub description: String,
    kind: Option<TicketKind>,
    severity: Option<EntityId>,
    customer: Option<EntityId>,
    responsible: Option<EntityId>,
    options: DraftOptions,
    debouncer: Debouncer,
}

impl TicketDraft {
    /// A blank form for the selected version.
    pub fn new(session: &SessionContext) -> Result<Self> {
        Ok(Self::for_version(session.require_version()?))
    }

    pub fn for_version(version: Version) -> Self {
        Self {
            version,
            name: String::new(),
            description: String::new(),
            kind: None,
            severity: None,
            customer: None,
            responsible: None,
            options: DraftOptions::default(),
            debouncer: Debouncer::default(),
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn options(&self) -> &DraftOptions {
        &self.options
    }

    /// Schedule a debounced reload of the option lists. Only the last call
    /// in a burst reaches the service; earlier handles resolve `Cancelled`.
    pub fn refresh_options(&mut self, service: Arc<dyn SupportService>) -> Debounced<DraftOptions> {
        let version = self.version.id;
        self.debouncer.call(async move {
            let (customers, responsibles, severities) = futures::try_join!(
                service.version_customers(version),
                service.responsibles(),
                service.severities(),
            )?;
            Ok(DraftOptions {
                customers,
                responsibles,
                severities,
            })
        })
    }

    /// Store refreshed options. A superseded refresh is ignored.
    pub fn apply_options(&mut self, outcome: Result<DraftOptions>) -> Result<()> {
        match outcome {
            Ok(options) => {
                debug!(
                    customers = options.customers.len(),
                    responsibles = options.responsibles.len(),
                    "ticket form options refreshed"
                );
                self.options = options;
                Ok(())
            }
            Err(PsaError::Cancelled(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn set_options(&mut self, options: DraftOptions) {
        self.options = options;
    }

    /// Customers whose name starts with `term`.
    pub fn customer_options(&self, term: &str) -> Vec<Customer> {
        search_customers(&self.options.customers, term, MatchRule::Prefix)
    }

    /// Responsibles whose name starts with `term`.
    pub fn responsible_options(&self, term: &str) -> Vec<Responsible> {
        search_responsibles(&self.options.responsibles, term, MatchRule::Prefix)
    }

    pub fn choose_customer(&mut self, id: EntityId) -> Result<&Customer> {
        let customer = self
            .options
            .customers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PsaError::NotFound(format!("customer {id} for this version")))?;
        self.customer = Some(id);
        Ok(customer)
    }

    pub fn choose_responsible(&mut self, id: Option<EntityId>) -> Result<()> {
        if let Some(id) = id
            && !self.options.responsibles.iter().any(|r| r.id == id)
        {
            return Err(PsaError::NotFound(format!("responsible {id}")));
        }
        self.responsible = id;
        Ok(())
    }

    /// Switching the type resets the severity: inquiries always send 0.
    pub fn set_kind(&mut self, kind: TicketKind) {
        self.kind = Some(kind);
        self.severity = match kind {
            TicketKind::Inquiry => Some(Severity::INQUIRY_ID),
            TicketKind::Error => None,
        };
    }

    pub fn choose_severity(&mut self, id: EntityId) -> Result<()> {
        if self.kind != Some(TicketKind::Error) {
            return Err(PsaError::MissingPrecondition(
                "only error tickets take a severity".to_string(),
            ));
        }
        if !self
            .options
            .severities
            .iter()
            .any(|s| s.id == id && !s.is_inquiry())
        {
            return Err(PsaError::NotFound(format!("severity {id}")));
        }
        self.severity = Some(id);
        Ok(())
    }

    /// Check the form and build the request parameters.
    pub fn validate(&self) -> Result<NewTicket> {
        let name = required_name(&self.name, "ticket title")?;
        let customer_id = self.customer.ok_or_else(|| {
            PsaError::MissingPrecondition("select a valid customer".to_string())
        })?;
        let kind = self.kind.ok_or_else(|| {
            PsaError::MissingPrecondition("choose a ticket type: error or consulta".to_string())
        })?;
        let severity_id = match kind {
            TicketKind::Inquiry => Severity::INQUIRY_ID,
            TicketKind::Error => self.severity.ok_or_else(|| {
                PsaError::MissingPrecondition("select a valid severity".to_string())
            })?,
        };

        Ok(NewTicket {
            name,
            description: self.description.clone(),
            customer_id,
            responsible_id: self.responsible,
            severity_id,
        })
    }

    /// Create the ticket and add it to `board`.
    pub async fn submit(
        &self,
        board: &mut TicketBoard,
        service: &dyn SupportService,
    ) -> Result<Reconciled> {
        let ticket = self.validate()?;
        let version = self.version.id;
        let reconciled = dispatch::apply_create(
            &mut board.view,
            service.create_ticket(version, &ticket),
            || service.tickets(),
        )
        .await?;
        info!(version, name = %ticket.name, ?reconciled, "ticket created");
        Ok(reconciled)
    }
}

/// Fields shared by the task and project forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemFields {
    pub name: String,
    pub description: String,
    /// `YYYY/MM/DD`, `YYYY-MM-DD` or a full ISO timestamp.
    pub start_date: String,
    pub end_date: String,
    pub consumed_hours: f64,
}

impl WorkItemFields {
    pub fn validate(&self, what: &str) -> Result<NewWorkItem> {
        let name = required_name(&self.name, what)?;
        if !self.consumed_hours.is_finite() || self.consumed_hours < 0.0 {
            return Err(PsaError::MissingPrecondition(
                "consumed hours must be zero or more".to_string(),
            ));
        }
        Ok(NewWorkItem {
            name,
            description: self.description.clone(),
            start_date: format_api_datetime(&self.start_date)?,
            end_date: format_api_datetime(&self.end_date)?,
            consumed_hours: self.consumed_hours,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub fields: WorkItemFields,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<NewWorkItem> {
        self.fields.validate("project name")
    }

    pub async fn submit(
        &self,
        board: &mut ProjectBoard,
        service: &dyn ProjectService,
    ) -> Result<Reconciled> {
        let project = self.validate()?;
        let reconciled = dispatch::apply_create(
            &mut board.projects,
            service.create_project(&project),
            || service.projects(),
        )
        .await?;
        info!(name = %project.name, ?reconciled, "project created");
        Ok(reconciled)
    }
}

/// A new task under an existing project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub project: EntityId,
    pub fields: WorkItemFields,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<NewWorkItem> {
        self.fields.validate("task name")
    }

    pub async fn submit(
        &self,
        board: &mut ProjectBoard,
        service: &dyn ProjectService,
    ) -> Result<Reconciled> {
        if board.projects.get(self.project).is_none() {
            return Err(PsaError::NotFound(format!("project {}", self.project)));
        }
        let task = self.validate()?;
        let project = self.project;
        let reconciled = dispatch::apply_create(
            &mut board.tasks,
            service.create_task(project, &task),
            || service.tasks(),
        )
        .await?;
        info!(project, name = %task.name, ?reconciled, "task created");
        Ok(reconciled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::lookup::Lookups;
    use crate::remote::fake::{FakeProjects, FakeSupport};
    use crate::types::{Product, Project};

    fn version() -> Version {
        Version {
            id: 3,
            name: "2.0".into(),
            product: Product {
                id: 1,
                name: "ERP".into(),
            },
        }
    }

    fn customer(id: EntityId, name: &str) -> Customer {
        Customer {
            id,
            name: name.into(),
            cuit: None,
        }
    }

    fn options() -> DraftOptions {
        DraftOptions {
            customers: vec![
                customer(1, "Acme"),
                customer(2, "Acero"),
                customer(3, "Bacon"),
                customer(4, "acústica"),
                customer(5, "Ac 5"),
                customer(6, "Ac 6"),
                customer(7, "Ac 7"),
            ],
            responsibles: vec![Responsible {
                id: 9,
                name: "Ana".into(),
                surname: "Pérez".into(),
            }],
            severities: vec![
                Severity {
                    id: 0,
                    name: "NA".into(),
                },
                Severity {
                    id: 2,
                    name: "S2".into(),
                },
            ],
        }
    }

    fn draft() -> TicketDraft {
        let mut draft = TicketDraft::for_version(version());
        draft.set_options(options());
        draft.name = "Login roto".into();
        draft
    }

    #[test]
    fn test_requires_selected_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = SessionContext::open(dir.path().join("session.json")).unwrap();
        assert!(matches!(
            TicketDraft::new(&session),
            Err(PsaError::MissingPrecondition(_))
        ));
    }

    #[test]
    fn test_customer_prefix_search_limits_to_five() {
        let draft = draft();
        let names: Vec<String> = draft
            .customer_options("ac")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Acme", "Acero", "acústica", "Ac 5", "Ac 6"]);
        assert_eq!(draft.customer_options("  ").len(), 7);
        assert!(draft.customer_options("con").is_empty());
    }

    #[test]
    fn test_inquiry_sends_severity_zero() {
        let mut draft = draft();
        draft.choose_customer(1).unwrap();
        draft.set_kind(TicketKind::Inquiry);
        assert!(draft.choose_severity(2).is_err());

        let ticket = draft.validate().unwrap();
        assert_eq!(ticket.severity_id, 0);
        assert_eq!(ticket.customer_id, 1);
        assert_eq!(ticket.responsible_id, None);
    }

    #[test]
    fn test_error_ticket_needs_severity_and_customer() {
        let mut draft = draft();
        draft.set_kind(TicketKind::Error);
        assert!(matches!(
            draft.validate(),
            Err(PsaError::MissingPrecondition(msg)) if msg.contains("customer")
        ));

        draft.choose_customer(2).unwrap();
        assert!(matches!(
            draft.validate(),
            Err(PsaError::MissingPrecondition(msg)) if msg.contains("severity")
        ));
        assert!(matches!(draft.choose_severity(0), Err(PsaError::NotFound(_))));

        draft.choose_severity(2).unwrap();
        draft.choose_responsible(Some(9)).unwrap();
        let ticket = draft.validate().unwrap();
        assert_eq!(ticket.severity_id, 2);
        assert_eq!(ticket.responsible_id, Some(9));
    }

    #[test]
    fn test_unknown_customer_rejected() {
        let mut draft = draft();
        assert!(matches!(draft.choose_customer(99), Err(PsaError::NotFound(_))));
        assert!(matches!(
            draft.choose_responsible(Some(99)),
            Err(PsaError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_option_refresh_is_debounced() {
        let service = Arc::new(FakeSupport {
            version_customers: vec![customer(1, "Acme")],
            ..Default::default()
        });
        let mut draft = TicketDraft::for_version(version());

        let first = draft.refresh_options(Arc::clone(&service) as Arc<dyn SupportService>);
        tokio::time::advance(Duration::from_millis(100)).await;
        let second = draft.refresh_options(Arc::clone(&service) as Arc<dyn SupportService>);

        draft.apply_options(first.result().await).unwrap();
        assert!(draft.options().customers.is_empty());
        draft.apply_options(second.result().await).unwrap();
        assert_eq!(draft.options().customers.len(), 1);

        let fetches = service
            .calls()
            .iter()
            .filter(|c| c.as_str() == "GET /versions/3/customers")
            .count();
        assert_eq!(fetches, 1);
    }

    #[tokio::test]
    async fn test_submit_inserts_created_ticket() {
        let service = FakeSupport {
            versions: vec![version()],
            ..Default::default()
        };
        let mut board = TicketBoard::new(Lookups::default());
        board.set_version(version());

        let mut draft = draft();
        draft.choose_customer(1).unwrap();
        draft.set_kind(TicketKind::Inquiry);
        let outcome = draft.submit(&mut board, &service).await.unwrap();

        assert_eq!(outcome, Reconciled::Inserted);
        assert_eq!(board.view().visible().len(), 1);
        assert_eq!(board.view().visible()[0].name, "Login roto");
    }

    #[test]
    fn test_work_item_dates_are_normalized() {
        let fields = WorkItemFields {
            name: "Deploy".into(),
            description: "prod".into(),
            start_date: "2024/06/01".into(),
            end_date: "2024-06-30".into(),
            consumed_hours: 2.5,
        };
        let body = fields.validate("task name").unwrap();
        assert_eq!(body.start_date, "2024-06-01T00:00:00");
        assert_eq!(body.end_date, "2024-06-30T00:00:00");

        let bad = WorkItemFields {
            start_date: "mañana".into(),
            ..fields.clone()
        };
        assert!(matches!(bad.validate("task name"), Err(PsaError::InvalidDate(..))));

        let negative = WorkItemFields {
            consumed_hours: -1.0,
            ..fields
        };
        assert!(negative.validate("task name").is_err());
    }

    #[tokio::test]
    async fn test_task_submit_requires_known_project() {
        let service = FakeProjects::default();
        let mut board = ProjectBoard::new();
        let draft = TaskDraft {
            project: 4,
            fields: WorkItemFields {
                name: "Deploy".into(),
                start_date: "2024/06/01".into(),
                end_date: "2024/06/02".into(),
                ..Default::default()
            },
        };
        assert!(matches!(
            draft.submit(&mut board, &service).await,
            Err(PsaError::NotFound(_))
        ));

        board.projects_mut().replace_all(vec![Project {
            id: 4,
            name: "Portal".into(),
            ..Default::default()
        }]);
        assert_eq!(
            draft.submit(&mut board, &service).await.unwrap(),
            Reconciled::Inserted
        );
        assert_eq!(board.tasks().all()[0].project, 4);
        assert!(service.calls().contains(&"POST /tasks/4".to_string()));
    }

    #[tokio::test]
    async fn test_silent_project_create_refetches() {
        let service = FakeProjects::default();
        service.silent.store(true, Ordering::SeqCst);
        let mut board = ProjectBoard::new();
        let draft = ProjectDraft {
            fields: WorkItemFields {
                name: "Portal".into(),
                start_date: "2024/06/01".into(),
                end_date: "2024/12/01".into(),
                ..Default::default()
            },
        };
        assert_eq!(
            draft.submit(&mut board, &service).await.unwrap(),
            Reconciled::Refetched
        );
        assert_eq!(board.projects().all().len(), 1);
    }
}
