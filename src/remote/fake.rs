//! In-memory services for view tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    ApiError, Echo, NewTicket, NewWorkItem, PatchDocument, PatchOp, ProjectService,
    SupportService, TaskReplacement,
};
use crate::error::Result;
use crate::types::{
    Customer, EntityId, Project, Responsible, Severity, Status, Task, Ticket, Version,
};

fn parse_id(value: Option<&String>) -> EntityId {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

#[derive(Default)]
pub(crate) struct FakeSupport {
    pub versions: Vec<Version>,
    pub customers: Vec<Customer>,
    pub version_customers: Vec<Customer>,
    pub responsibles: Vec<Responsible>,
    pub severities: Vec<Severity>,
    pub statuses: Vec<Status>,
    pub tickets: Mutex<Vec<Ticket>>,
    /// Answer mutations without a body.
    pub silent: AtomicBool,
    /// Answer every mutation with a 500.
    pub failing: AtomicBool,
    /// Reference lists ("statuses", "severities", ...) answering with a 500.
    pub down: Vec<&'static str>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSupport {
    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn list<T: Clone>(&self, name: &str, items: &[T]) -> Result<Vec<T>> {
        if self.down.iter().any(|d| *d == name) {
            return Err(ApiError::new(format!("{name} endpoint down"), "support").into());
        }
        Ok(items.to_vec())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::new("internal error", "support").into());
        }
        Ok(())
    }

    fn echo(&self, ticket: Ticket) -> Echo<Ticket> {
        if self.silent.load(Ordering::SeqCst) {
            Echo::Accepted
        } else {
            Echo::Echoed(ticket)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SupportService for FakeSupport {
    async fn versions(&self) -> Result<Vec<Version>> {
        self.list("versions", &self.versions)
    }

    async fn version_customers(&self, version: EntityId) -> Result<Vec<Customer>> {
        self.record(format!("GET /versions/{version}/customers"));
        self.list("version_customers", &self.version_customers)
    }

    async fn version_tickets(&self, version: EntityId) -> Result<Vec<Ticket>> {
        self.record(format!("GET /versions/{version}/tickets"));
        Ok(self
            .tickets
            .lock()
            .iter()
            .filter(|t| t.version.id == version)
            .cloned()
            .collect())
    }

    async fn create_ticket(&self, version: EntityId, ticket: &NewTicket) -> Result<Echo<Ticket>> {
        self.check()?;
        self.record(format!("POST /versions/{version}/tickets"));
        let mut tickets = self.tickets.lock();
        let id = tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Ticket {
            id,
            name: ticket.name.clone(),
            description: ticket.description.clone(),
            customer: ticket.customer_id,
            responsible: ticket.responsible_id,
            version: self
                .versions
                .iter()
                .find(|v| v.id == version)
                .cloned()
                .unwrap_or_default(),
            severity: Severity {
                id: ticket.severity_id,
                ..Default::default()
            },
            ..Default::default()
        };
        tickets.push(created.clone());
        Ok(self.echo(created))
    }

    async fn responsibles(&self) -> Result<Vec<Responsible>> {
        self.list("responsibles", &self.responsibles)
    }

    async fn severities(&self) -> Result<Vec<Severity>> {
        self.list("severities", &self.severities)
    }

    async fn statuses(&self) -> Result<Vec<Status>> {
        self.list("statuses", &self.statuses)
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        self.list("customers", &self.customers)
    }

    async fn tickets(&self) -> Result<Vec<Ticket>> {
        self.record("GET /tickets".to_string());
        Ok(self.tickets.lock().clone())
    }

    async fn patch_ticket(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Ticket>> {
        self.check()?;
        self.record(format!("PATCH /tickets/{id}"));
        let mut tickets = self.tickets.lock();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::new("ticket not found", "support"))?;

        for op in patch.operations() {
            let value = op.value.as_ref();
            match (op.op, op.path.as_str()) {
                (PatchOp::Replace, "/status/id") => {
                    let status_id = parse_id(value);
                    ticket.status = self
                        .statuses
                        .iter()
                        .find(|s| s.id == status_id)
                        .cloned()
                        .unwrap_or_default();
                }
                (PatchOp::Replace, "/severity/id") => {
                    let severity_id = parse_id(value);
                    ticket.severity = self
                        .severities
                        .iter()
                        .find(|s| s.id == severity_id)
                        .cloned()
                        .unwrap_or(Severity {
                            id: severity_id,
                            ..Default::default()
                        });
                }
                (PatchOp::Replace, "/customer") => ticket.customer = parse_id(value),
                (PatchOp::Replace, "/responsible") => ticket.responsible = Some(parse_id(value)),
                (PatchOp::Remove, "/responsible") => ticket.responsible = None,
                (PatchOp::Replace, "/name") => ticket.name = value.cloned().unwrap_or_default(),
                (PatchOp::Replace, "/description") => {
                    ticket.description = value.cloned().unwrap_or_default()
                }
                (PatchOp::Replace, "/version/id") => {
                    let version_id = parse_id(value);
                    if let Some(version) = self.versions.iter().find(|v| v.id == version_id) {
                        ticket.version = version.clone();
                    }
                }
                _ => {}
            }
        }
        let updated = ticket.clone();
        Ok(self.echo(updated))
    }

    async fn delete_ticket(&self, id: EntityId) -> Result<()> {
        self.check()?;
        self.record(format!("DELETE /tickets/{id}"));
        self.tickets.lock().retain(|t| t.id != id);
        Ok(())
    }

    async fn derive_ticket(&self, id: EntityId, project: EntityId) -> Result<()> {
        self.check()?;
        self.record(format!("POST /tickets/{id} projectId={project}"));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeProjects {
    pub projects: Mutex<Vec<Project>>,
    pub tasks: Mutex<Vec<Task>>,
    pub statuses: Vec<Status>,
    pub silent: AtomicBool,
    pub failing: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProjects {
    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::new("internal error", "project").into());
        }
        Ok(())
    }

    fn echo<T>(&self, entity: T) -> Echo<T> {
        if self.silent.load(Ordering::SeqCst) {
            Echo::Accepted
        } else {
            Echo::Echoed(entity)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ProjectService for FakeProjects {
    async fn projects(&self) -> Result<Vec<Project>> {
        self.record("GET /projects".to_string());
        Ok(self.projects.lock().clone())
    }

    async fn create_project(&self, project: &NewWorkItem) -> Result<Echo<Project>> {
        self.check()?;
        self.record("POST /projects".to_string());
        let mut projects = self.projects.lock();
        let created = Project {
            id: projects.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            name: project.name.clone(),
            description: project.description.clone(),
            start_date: project.start_date.clone(),
            end_date: project.end_date.clone(),
            consumed_hours: project.consumed_hours,
            ..Default::default()
        };
        projects.push(created.clone());
        Ok(self.echo(created))
    }

    async fn tasks(&self) -> Result<Vec<Task>> {
        self.record("GET /tasks/all".to_string());
        Ok(self.tasks.lock().clone())
    }

    async fn create_task(&self, project: EntityId, task: &NewWorkItem) -> Result<Echo<Task>> {
        self.check()?;
        self.record(format!("POST /tasks/{project}"));
        let mut tasks = self.tasks.lock();
        let created = Task {
            id: tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            name: task.name.clone(),
            description: task.description.clone(),
            start_date: task.start_date.clone(),
            end_date: task.end_date.clone(),
            consumed_hours: task.consumed_hours,
            project,
            ..Default::default()
        };
        tasks.push(created.clone());
        Ok(self.echo(created))
    }

    async fn replace_task(&self, id: EntityId, body: &TaskReplacement) -> Result<Echo<Task>> {
        self.check()?;
        self.record(format!("PUT /tasks/{id}"));
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::new("task not found", "project"))?;
        task.assignee = body.assignee.clone();
        task.consumed_hours = body.consumed_hours;
        task.description = body.description.clone();
        task.end_date = body.end_date.clone();
        task.name = body.name.clone();
        task.priority = body.priority.clone();
        task.start_date = body.start_date.clone();
        let updated = task.clone();
        Ok(self.echo(updated))
    }

    async fn patch_task(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Task>> {
        self.check()?;
        self.record(format!("PATCH /tasks/{id}"));
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::new("task not found", "project"))?;
        for op in patch.operations() {
            if op.op == PatchOp::Replace && op.path == "/status/id" {
                let status_id = parse_id(op.value.as_ref());
                task.status = self
                    .statuses
                    .iter()
                    .find(|s| s.id == status_id)
                    .cloned()
                    .unwrap_or_default();
            }
        }
        let updated = task.clone();
        Ok(self.echo(updated))
    }

    async fn delete_task(&self, id: EntityId) -> Result<()> {
        self.check()?;
        self.record(format!("DELETE /tasks/{id}"));
        self.tasks.lock().retain(|t| t.id != id);
        Ok(())
    }
}
