//! Project list and the task table of the selected project.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::collection::{CollectionView, MatchRule, Scope, SearchSpec, SortKey, SortKeyFn};
use crate::error::{PsaError, Result};
use crate::loader::Loader;
use crate::remote::{ProjectService, TaskEdit};
use crate::types::{EntityId, Project, Status, Task};
use crate::utils::sort_millis;

/// Task statuses the project service always accepts.
pub const TASK_STATUSES: [(EntityId, &str); 3] = [
    (1, "Iniciado"),
    (2, "En proceso"),
    (3, "Finalizado"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectColumn {
    Id,
    Name,
    Description,
    StartDate,
    EndDate,
}

enum_display_fromstr!(
    ProjectColumn,
    PsaError::invalid_sort_column,
    {
        Id => "id",
        Name => "name",
        Description => "description",
        StartDate => "startdate",
        EndDate => "enddate",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskColumn {
    Id,
    Name,
    Description,
    Priority,
    Status,
    StartDate,
    EndDate,
    ConsumedHours,
}

enum_display_fromstr!(
    TaskColumn,
    PsaError::invalid_sort_column,
    {
        Id => "id",
        Name => "name",
        Description => "description",
        Priority => "priority",
        Status => "status",
        StartDate => "startdate",
        EndDate => "enddate",
        ConsumedHours => "consumedhours",
    }
);

/// Actions the task option panel can open.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    Edit(TaskEdit),
    Assign(String),
    Delete,
}

fn name_field<T: Named>(item: &T) -> Vec<&str> {
    vec![item.name()]
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Task {
    fn name(&self) -> &str {
        &self.name
    }
}

fn project_key() -> SortKeyFn<Project, ProjectColumn> {
    Arc::new(|project: &Project, column: ProjectColumn| match column {
        ProjectColumn::Id => SortKey::Number(project.id as f64),
        ProjectColumn::Name => SortKey::text(&project.name),
        ProjectColumn::Description => SortKey::text(&project.description),
        ProjectColumn::StartDate => SortKey::Timestamp(sort_millis(&project.start_date)),
        ProjectColumn::EndDate => SortKey::Timestamp(sort_millis(&project.end_date)),
    })
}

fn task_key() -> SortKeyFn<Task, TaskColumn> {
    Arc::new(|task: &Task, column: TaskColumn| match column {
        TaskColumn::Id => SortKey::Number(task.id as f64),
        TaskColumn::Name => SortKey::text(&task.name),
        TaskColumn::Description => SortKey::text(&task.description),
        TaskColumn::Priority => SortKey::text(&task.priority),
        TaskColumn::Status => SortKey::text(&task.status.name),
        TaskColumn::StartDate => SortKey::Timestamp(sort_millis(&task.start_date)),
        TaskColumn::EndDate => SortKey::Timestamp(sort_millis(&task.end_date)),
        TaskColumn::ConsumedHours => SortKey::Number(task.consumed_hours),
    })
}

/// Projects and tasks, both unpaginated.
pub struct ProjectBoard {
    pub(crate) projects: CollectionView<Project, ProjectColumn>,
    pub(crate) tasks: CollectionView<Task, TaskColumn, TaskAction>,
    project: Option<Project>,
    project_loader: Loader<&'static str>,
    task_loader: Loader<&'static str>,
}

impl Default for ProjectBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectBoard {
    pub fn new() -> Self {
        Self {
            projects: CollectionView::new(
                SearchSpec::new(MatchRule::Contains, name_field::<Project>),
                project_key(),
                None,
            ),
            tasks: CollectionView::new(
                SearchSpec::new(MatchRule::Contains, name_field::<Task>),
                task_key(),
                None,
            ),
            project: None,
            project_loader: Loader::new(),
            task_loader: Loader::new(),
        }
    }

    pub fn projects(&self) -> &CollectionView<Project, ProjectColumn> {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut CollectionView<Project, ProjectColumn> {
        &mut self.projects
    }

    pub fn tasks(&self) -> &CollectionView<Task, TaskColumn, TaskAction> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut CollectionView<Task, TaskColumn, TaskAction> {
        &mut self.tasks
    }

    /// Fetch projects and tasks concurrently.
    ///
    /// A task failure is logged and leaves the task table empty; only a
    /// project failure is returned.
    pub async fn load(&mut self, service: Arc<dyn ProjectService>) -> Result<()> {
        self.projects.begin_load();
        self.tasks.begin_load();

        let for_projects = Arc::clone(&service);
        let projects = self
            .project_loader
            .spawn("projects", async move { for_projects.projects().await });
        let tasks = self
            .task_loader
            .spawn("tasks", async move { service.tasks().await });
        let (projects, tasks) = futures::join!(projects.finish(), tasks.finish());

        if let Err(e) = self.tasks.finish_load(tasks) {
            warn!(error = %e, "failed to load tasks");
        }
        if let Ok(list) = &projects {
            debug!(total = list.len(), "projects loaded");
        }
        self.projects.finish_load(projects)
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Select project `id` and scope the task table to it.
    pub fn select_project(&mut self, id: EntityId) -> Result<&Project> {
        let project = self
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| PsaError::NotFound(format!("project {id}")))?;
        self.projects.select(id)?;

        let scope: Scope<Task> = Arc::new(move |task: &Task| task.project == id);
        self.tasks.selection_mut().clear();
        self.tasks.set_term("");
        self.tasks.set_scope(Some(scope));
        Ok(self.project.insert(project))
    }

    /// Back to the project list; every task is visible again.
    pub fn clear_project(&mut self) {
        self.project = None;
        self.projects.selection_mut().clear();
        self.projects.set_term("");
        self.tasks.selection_mut().clear();
        self.tasks.set_term("");
        self.tasks.set_scope(None);
    }

    pub fn require_project(&self) -> Result<&Project> {
        self.project
            .as_ref()
            .ok_or_else(|| PsaError::MissingPrecondition("no project selected".to_string()))
    }

    pub fn select_task(&mut self, id: EntityId) -> Result<&Task> {
        self.tasks.select(id)
    }

    /// Statuses seen on loaded tasks, in first-seen order, followed by any
    /// catalog status no task uses yet.
    pub fn status_options(&self) -> Vec<Status> {
        let mut options: Vec<Status> = Vec::new();
        for task in self.tasks.all() {
            if !options.iter().any(|s| s.id == task.status.id) {
                options.push(task.status.clone());
            }
        }
        for (id, name) in TASK_STATUSES {
            let known = options
                .iter()
                .any(|s| s.id == id || s.name.eq_ignore_ascii_case(name));
            if !known {
                options.push(Status {
                    id,
                    name: name.to_string(),
                });
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::FakeProjects;

    fn status(id: EntityId, name: &str) -> Status {
        Status {
            id,
            name: name.into(),
        }
    }

    fn project(id: EntityId, name: &str) -> Project {
        Project {
            id,
            name: name.into(),
            start_date: format!("2024-0{id}-01"),
            ..Default::default()
        }
    }

    fn task(id: EntityId, project: EntityId, name: &str, status_id: EntityId) -> Task {
        Task {
            id,
            name: name.into(),
            project,
            priority: if id % 2 == 0 { "Alta".into() } else { "Baja".into() },
            status: status(status_id, if status_id == 1 { "Iniciado" } else { "En proceso" }),
            consumed_hours: id as f64,
            ..Default::default()
        }
    }

    fn service() -> Arc<FakeProjects> {
        Arc::new(FakeProjects {
            projects: parking_lot::Mutex::new(vec![
                project(1, "Portal"),
                project(2, "Migración"),
            ]),
            tasks: parking_lot::Mutex::new(vec![
                task(1, 1, "Login", 1),
                task(2, 1, "Logout", 2),
                task(3, 2, "Export", 1),
            ]),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_load_fills_both_tables() {
        let mut board = ProjectBoard::new();
        board.load(service()).await.unwrap();
        assert_eq!(board.projects().all().len(), 2);
        assert_eq!(board.tasks().all().len(), 3);
        assert!(!board.projects().is_loading());
    }

    #[tokio::test]
    async fn test_selecting_project_scopes_tasks() {
        let mut board = ProjectBoard::new();
        board.load(service()).await.unwrap();

        board.select_project(1).unwrap();
        let ids: Vec<EntityId> = board.tasks().visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);

        board.tasks_mut().set_term("logo");
        assert_eq!(board.tasks().visible().len(), 1);

        board.clear_project();
        assert_eq!(board.tasks().visible().len(), 3);
        assert!(board.require_project().is_err());
    }

    #[tokio::test]
    async fn test_project_search_by_name() {
        let mut board = ProjectBoard::new();
        board.load(service()).await.unwrap();
        board.projects_mut().set_term("  MIGR ");
        assert_eq!(board.projects().visible()[0].id, 2);
        assert_eq!(board.projects().visible().len(), 1);
    }

    #[tokio::test]
    async fn test_task_sort_columns() {
        let mut board = ProjectBoard::new();
        board.load(service()).await.unwrap();

        board.tasks_mut().sort_by("ConsumedHours".parse().unwrap());
        board.tasks_mut().sort_by(TaskColumn::ConsumedHours);
        let ids: Vec<EntityId> = board.tasks().visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        board.tasks_mut().sort_by(TaskColumn::Priority);
        let first = &board.tasks().visible()[0];
        assert_eq!(first.priority, "Alta");
    }

    #[tokio::test]
    async fn test_back_to_projects_drops_task_search() {
        let mut board = ProjectBoard::new();
        board.load(service()).await.unwrap();

        board.select_project(1).unwrap();
        board.tasks_mut().set_term("login");
        assert_eq!(board.tasks().visible().len(), 1);

        board.clear_project();
        assert_eq!(board.tasks().term(), "");
        let ids: Vec<EntityId> = board.tasks().visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_status_options_are_distinct() {
        let mut board = ProjectBoard::new();
        board.tasks_mut().replace_all(vec![
            task(1, 1, "a", 2),
            task(2, 1, "b", 1),
            task(3, 1, "c", 2),
        ]);
        let names: Vec<String> = board.status_options().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["En proceso", "Iniciado", "Finalizado"]);
    }

    #[test]
    fn test_status_options_offer_unused_catalog_statuses() {
        let mut board = ProjectBoard::new();
        board.tasks_mut().replace_all(vec![task(1, 1, "a", 1), task(2, 1, "b", 1)]);
        let options = board.status_options();
        let ids: Vec<EntityId> = options.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(options[2].name, "Finalizado");

        let empty = ProjectBoard::new();
        assert_eq!(empty.status_options().len(), TASK_STATUSES.len());
    }

    #[test]
    fn test_unknown_project() {
        let mut board = ProjectBoard::new();
        assert!(matches!(board.select_project(9), Err(PsaError::NotFound(_))));
    }
}
