//! Task commands: the task table of the project module and its row actions.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, apply_list_args, mutation_json, page_json, print_json};
use crate::cli::{ListArgs, OutputOptions, WorkItemArgs};
use crate::console::Console;
use crate::display::{
    TaskTableRow, format_date_for_display, format_page_footer, format_sort_note,
    format_status_colored, render_table,
};
use crate::dispatch::Reconciled;
use crate::error::{PsaError, Result};
use crate::types::EntityId;
use crate::views::{ProjectBoard, TaskDraft, TaskPanel, WorkItemFields};

/// List tasks, optionally only those of one project
pub async fn cmd_task_ls(
    console: &Console,
    project: Option<EntityId>,
    list: &ListArgs,
) -> Result<()> {
    let mut board = console.project_board().await?;
    if let Some(project) = project {
        let project = board.select_project(project)?;
        if !list.json {
            println!("Proyecto: {}", project.name.cyan());
        }
    }
    apply_list_args(board.tasks_mut(), list)?;

    let view = board.tasks();
    let page = view.page_info();
    if list.json {
        return print_json(&page_json(view.page_rows(), &page));
    }

    if view.visible().is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    let rows: Vec<TaskTableRow> = view.page_rows().iter().map(TaskTableRow::from).collect();
    println!("{}", render_table(rows));
    let note = format_sort_note(view.sort_state());
    if !note.is_empty() {
        println!("{}", note.dimmed());
    }
    println!("{}", format_page_footer(&page));
    Ok(())
}

pub async fn cmd_task_show(console: &Console, id: EntityId, output: OutputOptions) -> Result<()> {
    let mut board = console.project_board().await?;
    let task = board.select_task(id)?.clone();
    let project = board
        .projects()
        .get(task.project)
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let mut text = format!("{} {}\n", format!("#{}", task.id).cyan(), task.name.bold());
    text.push_str(&format!("Proyecto: {project}\n"));
    text.push_str(&format!("Estado: {}\n", format_status_colored(&task.status.name)));
    text.push_str(&format!("Prioridad: {}\n", task.priority));
    text.push_str(&format!(
        "Fechas: {} - {}\n",
        format_date_for_display(&task.start_date),
        format_date_for_display(&task.end_date)
    ));
    text.push_str(&format!("Horas consumidas: {}\n", task.consumed_hours));
    if let Some(assignee) = &task.assignee {
        text.push_str(&format!("Asignado: {assignee}\n"));
    }
    if !task.description.is_empty() {
        text.push_str(&format!("\n{}", task.description));
    }

    let mut json = serde_json::to_value(&task)?;
    json["projectName"] = json!(project);
    CommandOutput::new(json)
        .with_text(text.trim_end().to_string())
        .print(output)
}

/// Create a task under an existing project
pub async fn cmd_task_create(
    console: &Console,
    project: EntityId,
    fields: &WorkItemArgs,
) -> Result<()> {
    let draft = TaskDraft {
        project,
        fields: WorkItemFields::from(fields),
    };
    draft.validate()?;

    let mut board = console.project_board().await?;
    let service = console.projects();
    let reconciled = draft.submit(&mut board, service.as_ref()).await?;

    CommandOutput::new(json!({
        "action": "task_create",
        "project": project,
        "name": draft.fields.name.trim(),
        "reconciled": format!("{reconciled:?}").to_lowercase(),
        "success": true,
    }))
    .with_text(format!(
        "Created task {} in project {}",
        draft.fields.name.trim().cyan(),
        project
    ))
    .print(OutputOptions { json: fields.json })
}

fn report(
    board: &ProjectBoard,
    action: &str,
    id: EntityId,
    reconciled: Reconciled,
    output: OutputOptions,
) -> Result<()> {
    let task = board.tasks().get(id);
    let mut json = mutation_json(action, id, reconciled);
    json["task"] = serde_json::to_value(task)?;

    let label = format!("#{id}").cyan().to_string();
    let text = match (reconciled, task) {
        (Reconciled::Removed, _) => format!("Task {label} removed"),
        (_, Some(task)) => format!(
            "Task {label} updated: {} {}",
            task.name,
            format_status_colored(&task.status.name)
        ),
        (_, None) => format!("Task {label} updated"),
    };
    CommandOutput::new(json).with_text(text).print(output)
}

/// Move a task to another of the known statuses
pub async fn cmd_task_status(
    console: &Console,
    id: EntityId,
    status: &str,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.project_board().await?;
    let status = match status.trim().parse::<EntityId>() {
        Ok(id) => id,
        Err(_) => board
            .status_options()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(status.trim()))
            .map(|s| s.id)
            .ok_or_else(|| PsaError::NotFound(format!("task status '{status}'")))?,
    };

    let service = console.projects();
    let reconciled = TaskPanel::new(&mut board, service.as_ref())
        .set_status(id, status)
        .await?;
    report(&board, "task_status", id, reconciled, output)
}

pub async fn cmd_task_assign(
    console: &Console,
    id: EntityId,
    assignee: &str,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.project_board().await?;
    let service = console.projects();
    let reconciled = TaskPanel::new(&mut board, service.as_ref())
        .assign(id, assignee)
        .await?;
    report(&board, "task_assign", id, reconciled, output)
}

pub async fn cmd_task_delete(console: &Console, id: EntityId, output: OutputOptions) -> Result<()> {
    let mut board = console.project_board().await?;
    let service = console.projects();
    let reconciled = TaskPanel::new(&mut board, service.as_ref())
        .delete(id)
        .await?;
    report(&board, "task_delete", id, reconciled, output)
}
