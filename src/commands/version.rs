//! Version selection commands: the entry point of the support module.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, apply_list_args, page_json, print_json};
use crate::cli::{ListArgs, OutputOptions};
use crate::console::Console;
use crate::display::{VersionTableRow, format_page_footer, format_sort_note, render_table};
use crate::error::Result;
use crate::types::EntityId;

/// List versions, ten per page
pub async fn cmd_version_ls(console: &Console, list: &ListArgs) -> Result<()> {
    let mut picker = console.version_picker().await?;
    apply_list_args(picker.view_mut(), list)?;

    let view = picker.view();
    let page = view.page_info();
    if list.json {
        return print_json(&page_json(view.page_rows(), &page));
    }

    if view.visible().is_empty() {
        println!("No versions found.");
        return Ok(());
    }
    let rows: Vec<VersionTableRow> = view.page_rows().iter().map(VersionTableRow::from).collect();
    println!("{}", render_table(rows));
    let note = format_sort_note(view.sort_state());
    if !note.is_empty() {
        println!("{}", note.dimmed());
    }
    println!("{}", format_page_footer(&page));
    Ok(())
}

/// Select the version ticket commands operate on
pub async fn cmd_version_select(
    console: &Console,
    id: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut picker = console.version_picker().await?;
    let version = picker.choose(id, console.session())?;

    CommandOutput::new(json!({
        "action": "version_select",
        "version": version,
        "success": true,
    }))
    .with_text(format!(
        "Versión seleccionada: {}",
        version.label().cyan()
    ))
    .print(output)
}

pub fn cmd_version_show(console: &Console, output: OutputOptions) -> Result<()> {
    let selected = console.session().selected();
    let text = match &selected {
        Some(version) => format!(
            "Versión seleccionada: {} {}",
            version.label().cyan(),
            format!("(id {})", version.id).dimmed()
        ),
        None => format!("{}", "No version selected".dimmed()),
    };

    CommandOutput::new(json!({ "version": selected }))
        .with_text(text)
        .print(output)
}

/// Forget the selected version (the "change version" action)
pub fn cmd_version_clear(console: &Console, output: OutputOptions) -> Result<()> {
    console.enter_support()?;
    CommandOutput::new(json!({
        "action": "version_clear",
        "success": true,
    }))
    .with_text("Version selection cleared")
    .print(output)
}
