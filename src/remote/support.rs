//! HTTP client for the support (tickets) service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::info;

use super::patch::JSON_PATCH_CONTENT_TYPE;
use super::{Echo, HttpService, NewTicket, PatchDocument, SupportService};
use crate::config::Config;
use crate::error::Result;
use crate::types::{Customer, EntityId, Responsible, Severity, Status, Ticket, Version};

const SERVICE: &str = "support";

#[derive(Debug, Clone)]
pub struct SupportClient {
    http: HttpService,
}

impl SupportClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpService::new(SERVICE, base_url, timeout)?,
        })
    }

    /// Client for the configured support URL (env override first).
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.support_url(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl SupportService for SupportClient {
    async fn versions(&self) -> Result<Vec<Version>> {
        self.http.get_json("/versions").await
    }

    async fn version_customers(&self, version: EntityId) -> Result<Vec<Customer>> {
        self.http
            .get_json(&format!("/versions/{version}/customers"))
            .await
    }

    async fn version_tickets(&self, version: EntityId) -> Result<Vec<Ticket>> {
        self.http
            .get_json(&format!("/versions/{version}/tickets"))
            .await
    }

    async fn create_ticket(&self, version: EntityId, ticket: &NewTicket) -> Result<Echo<Ticket>> {
        let request = self
            .http
            .request(Method::POST, &format!("/versions/{version}/tickets"))
            .query(ticket);
        let response = self.http.send(request).await?;
        info!(version, name = %ticket.name, "ticket created");
        self.http.echo(response).await
    }

    async fn responsibles(&self) -> Result<Vec<Responsible>> {
        self.http.get_json("/responsibles").await
    }

    async fn severities(&self) -> Result<Vec<Severity>> {
        self.http.get_json("/severities").await
    }

    async fn statuses(&self) -> Result<Vec<Status>> {
        self.http.get_json("/statuses").await
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        self.http.get_json("/customers").await
    }

    async fn tickets(&self) -> Result<Vec<Ticket>> {
        self.http.get_json("/tickets").await
    }

    async fn patch_ticket(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Ticket>> {
        let request = self
            .http
            .request(Method::PATCH, &format!("/tickets/{id}"))
            .header(CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
            .body(serde_json::to_vec(patch)?);
        let response = self.http.send(request).await?;
        self.http.echo(response).await
    }

    async fn delete_ticket(&self, id: EntityId) -> Result<()> {
        let request = self
            .http
            .request(Method::DELETE, &format!("/tickets/{id}"))
            .header(ACCEPT, "application/hal+json");
        self.http.send(request).await?;
        info!(ticket = id, "ticket deleted");
        Ok(())
    }

    async fn derive_ticket(&self, id: EntityId, project: EntityId) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, &format!("/tickets/{id}"))
            .form(&[("projectId", project.to_string())]);
        self.http.send(request).await?;
        info!(ticket = id, project, "ticket derived to project");
        Ok(())
    }
}
