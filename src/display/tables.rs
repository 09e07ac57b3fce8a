//! `tabled` rows for the listing commands.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{format_date_for_display, format_status_colored};
use crate::types::{Project, Task, Version};
use crate::utils::truncate;
use crate::views::TicketRow;

const DESCRIPTION_WIDTH: usize = 40;

#[derive(Tabled)]
pub struct VersionTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Producto")]
    pub product: String,
    #[tabled(rename = "Versión")]
    pub name: String,
}

impl From<&Version> for VersionTableRow {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id,
            product: version.product.name.clone(),
            name: version.name.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct TicketTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Título")]
    pub title: String,
    #[tabled(rename = "Fecha")]
    pub opened: String,
    #[tabled(rename = "Cliente")]
    pub customer: String,
    #[tabled(rename = "Tipo")]
    pub kind: String,
    #[tabled(rename = "Severidad")]
    pub severity: String,
    #[tabled(rename = "Estado")]
    pub status: String,
    #[tabled(rename = "Responsable")]
    pub responsible: String,
}

impl From<&TicketRow> for TicketTableRow {
    fn from(row: &TicketRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            opened: row.opened.clone(),
            customer: row.customer.clone(),
            kind: row.kind.clone(),
            severity: row.severity.clone(),
            status: format_status_colored(&row.status),
            responsible: row.responsible.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct ProjectTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Nombre")]
    pub name: String,
    #[tabled(rename = "Descripción")]
    pub description: String,
    #[tabled(rename = "Inicio")]
    pub start: String,
    #[tabled(rename = "Fin")]
    pub end: String,
}

impl From<&Project> for ProjectTableRow {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: truncate(&project.description, DESCRIPTION_WIDTH),
            start: format_date_for_display(&project.start_date),
            end: format_date_for_display(&project.end_date),
        }
    }
}

#[derive(Tabled)]
pub struct TaskTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Nombre")]
    pub name: String,
    #[tabled(rename = "Prioridad")]
    pub priority: String,
    #[tabled(rename = "Estado")]
    pub status: String,
    #[tabled(rename = "Inicio")]
    pub start: String,
    #[tabled(rename = "Fin")]
    pub end: String,
    #[tabled(rename = "Horas")]
    pub hours: String,
    #[tabled(rename = "Asignado")]
    pub assignee: String,
}

impl From<&Task> for TaskTableRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            priority: task.priority.clone(),
            status: format_status_colored(&task.status.name),
            start: format_date_for_display(&task.start_date),
            end: format_date_for_display(&task.end_date),
            hours: format!("{}", task.consumed_hours),
            assignee: task.assignee.clone().unwrap_or_default(),
        }
    }
}

/// Render rows with the rounded style used by every listing.
pub fn render_table<R: Tabled>(rows: Vec<R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
