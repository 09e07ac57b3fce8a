mod config;
mod project;
mod task;
mod ticket;
mod version;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use project::{cmd_project_create, cmd_project_ls};
pub use task::{
    cmd_task_assign, cmd_task_create, cmd_task_delete, cmd_task_ls, cmd_task_show,
    cmd_task_status,
};
pub use ticket::{
    TicketCreateOptions, cmd_ticket_create, cmd_ticket_customer, cmd_ticket_delete,
    cmd_ticket_derive, cmd_ticket_describe, cmd_ticket_ls, cmd_ticket_move, cmd_ticket_rename,
    cmd_ticket_responsible, cmd_ticket_severity, cmd_ticket_show, cmd_ticket_status,
    cmd_ticket_watch,
};
pub use version::{cmd_version_clear, cmd_version_ls, cmd_version_select, cmd_version_show};

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::{ListArgs, OutputOptions};
use crate::collection::{CollectionView, PageInfo, SortDirection, SortState};
use crate::dispatch::Reconciled;
use crate::error::{PsaError, Result};
use crate::types::{EntityId, Record};

/// Output of a command: JSON always, plus an optional human rendering.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match (output.json, self.text) {
            (false, Some(text)) => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply `--search`, `--sort`/`--desc` and `--page` to a view.
pub(crate) fn apply_list_args<T, C, A>(
    view: &mut CollectionView<T, C, A>,
    list: &ListArgs,
) -> Result<()>
where
    T: Record,
    C: Copy + PartialEq + FromStr<Err = PsaError>,
    A: Clone,
{
    if let Some(term) = &list.search {
        view.set_term(term);
    }
    if let Some(column) = &list.sort {
        let column = column.parse::<C>()?;
        let direction = if list.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        view.set_sort(Some(SortState { column, direction }));
    }
    if list.page == 0 || list.page > view.page_info().page_count() {
        return Err(PsaError::NotFound(format!("page {}", list.page)));
    }
    view.go_to_page(list.page);
    Ok(())
}

/// JSON envelope for a listing.
pub(crate) fn page_json<R: Serialize>(rows: &[R], page: &PageInfo) -> Value {
    json!({
        "rows": rows,
        "page": page,
        "has_previous": page.has_previous(),
        "has_next": page.has_next(),
    })
}

/// JSON for a confirmed mutation.
pub(crate) fn mutation_json(action: &str, id: EntityId, reconciled: Reconciled) -> Value {
    json!({
        "action": action,
        "id": id,
        "reconciled": format!("{reconciled:?}").to_lowercase(),
        "success": true,
    })
}
