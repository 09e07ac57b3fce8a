//! HTTP client for the project (projects and tasks) service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use tracing::info;

use super::patch::JSON_PATCH_CONTENT_TYPE;
use super::{Echo, HttpService, NewWorkItem, PatchDocument, ProjectService, TaskReplacement};
use crate::config::Config;
use crate::error::Result;
use crate::types::{EntityId, Project, Task};

const SERVICE: &str = "project";

#[derive(Debug, Clone)]
pub struct ProjectClient {
    http: HttpService,
}

impl ProjectClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpService::new(SERVICE, base_url, timeout)?,
        })
    }

    /// Client for the configured project URL (env override first).
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.project_url(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl ProjectService for ProjectClient {
    async fn projects(&self) -> Result<Vec<Project>> {
        self.http.get_json("/projects").await
    }

    async fn create_project(&self, project: &NewWorkItem) -> Result<Echo<Project>> {
        let request = self.http.request(Method::POST, "/projects").json(project);
        let response = self.http.send(request).await?;
        info!(name = %project.name, "project created");
        self.http.echo(response).await
    }

    async fn tasks(&self) -> Result<Vec<Task>> {
        self.http.get_json("/tasks/all").await
    }

    async fn create_task(&self, project: EntityId, task: &NewWorkItem) -> Result<Echo<Task>> {
        let request = self
            .http
            .request(Method::POST, &format!("/tasks/{project}"))
            .json(task);
        let response = self.http.send(request).await?;
        info!(project, name = %task.name, "task created");
        self.http.echo(response).await
    }

    async fn replace_task(&self, id: EntityId, task: &TaskReplacement) -> Result<Echo<Task>> {
        let request = self
            .http
            .request(Method::PUT, &format!("/tasks/{id}"))
            .json(task);
        let response = self.http.send(request).await?;
        self.http.echo(response).await
    }

    async fn patch_task(&self, id: EntityId, patch: &PatchDocument) -> Result<Echo<Task>> {
        let request = self
            .http
            .request(Method::PATCH, &format!("/tasks/{id}"))
            .header(CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
            .body(serde_json::to_vec(patch)?);
        let response = self.http.send(request).await?;
        self.http.echo(response).await
    }

    async fn delete_task(&self, id: EntityId) -> Result<()> {
        self.http
            .send(self.http.request(Method::DELETE, &format!("/tasks/{id}")))
            .await?;
        info!(task = id, "task deleted");
        Ok(())
    }
}
