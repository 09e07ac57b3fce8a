//! Clients for the project and support services.
//!
//! Each service is a trait so views can run against the real HTTP clients
//! ([`ProjectClient`], [`SupportClient`]) or an in-memory stand-in.

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod patch;
pub mod project;
pub mod support;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::types::{
    Customer, EntityId, Project, Responsible, Severity, Status, Task, Ticket, Version,
};

pub use error::ApiError;
pub use patch::{PatchDocument, PatchOp, PatchOperation, TaskEdit, TicketEdit};
pub use project::ProjectClient;
pub use support::SupportClient;

/// What a mutating request returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Echo<T> {
    /// The service answered with the updated or created entity.
    Echoed(T),
    /// The service acknowledged without a usable representation.
    Accepted,
}

/// Query parameters for `POST /versions/{id}/tickets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub name: String,
    pub description: String,
    pub customer_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_id: Option<EntityId>,
    pub severity_id: EntityId,
}

/// Body for `POST /projects` and `POST /tasks/{projectId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkItem {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub consumed_hours: f64,
}

/// Full-replace body for `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReplacement {
    pub assignee: Option<String>,
    pub consumed_hours: f64,
    pub description: String,
    pub end_date: String,
    pub name: String,
    pub priority: String,
    pub start_date: String,
}

impl TaskReplacement {
    /// Current task fields, to be edited before sending.
    pub fn from_task(task: &Task) -> Self {
        Self {
            assignee: task.assignee.clone(),
            consumed_hours: task.consumed_hours,
            description: task.description.clone(),
            end_date: task.end_date.clone(),
            name: task.name.clone(),
            priority: task.priority.clone(),
            start_date: task.start_date.clone(),
        }
    }
}

/// The support service: versions, customers and tickets.
#[async_trait]
pub trait SupportService: Send + Sync {
    async fn versions(&self) -> Result<Vec<Version>>;
    async fn version_customers(&self, version: EntityId) -> Result<Vec<Customer>>;
    async fn version_tickets(&self, version: EntityId) -> Result<Vec<Ticket>>;
    async fn create_ticket(&self, version: EntityId, ticket: &NewTicket) -> Result<Echo<Ticket>>;
    async fn responsibles(&self) -> Result<Vec<Responsible>>;
    async fn severities(&self) -> Result<Vec<Severity>>;
    async fn statuses(&self) -> Result<Vec<Status>>;
    async fn customers(&self) -> Result<Vec<Customer>>;
    async fn tickets(&self) -> Result<Vec<Ticket>>;
    async fn patch_ticket(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Ticket>>;
    async fn delete_ticket(&self, id: EntityId) -> Result<()>;
    /// Link a ticket to a project as a task.
    async fn derive_ticket(&self, id: EntityId, project: EntityId) -> Result<()>;
}

/// The project service: projects and their tasks.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, project: &NewWorkItem) -> Result<Echo<Project>>;
    async fn tasks(&self) -> Result<Vec<Task>>;
    async fn create_task(&self, project: EntityId, task: &NewWorkItem) -> Result<Echo<Task>>;
    async fn replace_task(&self, id: EntityId, task: &TaskReplacement) -> Result<Echo<Task>>;
    async fn patch_task(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Task>>;
    async fn delete_task(&self, id: EntityId) -> Result<()>;
}

/// reqwest plumbing shared by both clients.
#[derive(Debug, Clone)]
pub(crate) struct HttpService {
    client: Client,
    base_url: String,
    name: &'static str,
}

impl HttpService {
    pub(crate) fn new(name: &'static str, base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            name,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(service = self.name, %method, path, "sending request");
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send and map non-success statuses to [`ApiError`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(service = self.name, status = status.as_u16(), "response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::with_status(body, self.name, status).into());
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    /// Read a mutation response, treating an empty or foreign body as
    /// [`Echo::Accepted`].
    pub(crate) async fn echo<T: DeserializeOwned>(&self, response: Response) -> Result<Echo<T>> {
        let bytes = response.bytes().await?;
        Ok(parse_echo(self.name, &bytes))
    }
}

fn parse_echo<T: DeserializeOwned>(service: &'static str, body: &[u8]) -> Echo<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Echo::Accepted;
    }
    match serde_json::from_slice(body) {
        Ok(entity) => Echo::Echoed(entity),
        Err(e) => {
            debug!(service, error = %e, "mutation response is not an entity");
            Echo::Accepted
        }
    }
}
