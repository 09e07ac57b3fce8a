//! Project commands.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, apply_list_args, page_json, print_json};
use crate::cli::{ListArgs, OutputOptions, WorkItemArgs};
use crate::console::Console;
use crate::display::{ProjectTableRow, format_page_footer, format_sort_note, render_table};
use crate::error::Result;
use crate::views::{ProjectDraft, WorkItemFields};

impl From<&WorkItemArgs> for WorkItemFields {
    fn from(args: &WorkItemArgs) -> Self {
        Self {
            name: args.name.clone(),
            description: args.description.clone(),
            start_date: args.start.clone(),
            end_date: args.end.clone(),
            consumed_hours: args.hours,
        }
    }
}

pub async fn cmd_project_ls(console: &Console, list: &ListArgs) -> Result<()> {
    let mut board = console.project_board().await?;
    apply_list_args(board.projects_mut(), list)?;

    let view = board.projects();
    let page = view.page_info();
    if list.json {
        return print_json(&page_json(view.page_rows(), &page));
    }

    if view.visible().is_empty() {
        println!("No projects found.");
        return Ok(());
    }
    let rows: Vec<ProjectTableRow> = view.page_rows().iter().map(ProjectTableRow::from).collect();
    println!("{}", render_table(rows));
    let note = format_sort_note(view.sort_state());
    if !note.is_empty() {
        println!("{}", note.dimmed());
    }
    println!("{}", format_page_footer(&page));
    Ok(())
}

pub async fn cmd_project_create(console: &Console, fields: &WorkItemArgs) -> Result<()> {
    let draft = ProjectDraft {
        fields: WorkItemFields::from(fields),
    };
    // Validate before touching the network.
    draft.validate()?;

    let mut board = console.project_board().await?;
    let service = console.projects();
    let reconciled = draft.submit(&mut board, service.as_ref()).await?;

    CommandOutput::new(json!({
        "action": "project_create",
        "name": draft.fields.name.trim(),
        "reconciled": format!("{reconciled:?}").to_lowercase(),
        "success": true,
    }))
    .with_text(format!("Created project {}", draft.fields.name.trim().cyan()))
    .print(OutputOptions { json: fields.json })
}
