//! Ticket commands: the ticket table, its detail panel and the option panel
//! actions.

use std::time::Duration;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::debug;

use super::{CommandOutput, apply_list_args, mutation_json, page_json, print_json};
use crate::cli::{ListArgs, OutputOptions};
use crate::console::Console;
use crate::display::{
    TicketTableRow, format_page_footer, format_sla_line, format_sort_note, format_ticket_detail,
    render_table,
};
use crate::dispatch::Reconciled;
use crate::error::{PsaError, Result};
use crate::sla::{COUNTDOWN_PERIOD, SlaStatus, sla_status, system_clock};
use crate::types::{Customer, EntityId, Responsible, TicketKind};
use crate::views::{TicketBoard, TicketDraft, TicketPanel, TicketRow};

/// List the selected version's tickets, twenty per page
pub async fn cmd_ticket_ls(console: &Console, list: &ListArgs) -> Result<()> {
    let mut board = console.ticket_board().await?;
    apply_list_args(board.view_mut(), list)?;

    let rows = board.rows();
    let page = board.view().page_info();
    if list.json {
        return print_json(&page_json(&rows, &page));
    }

    if let Some(version) = board.version() {
        println!("Versión seleccionada: {}", version.label().cyan());
    }
    if rows.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }
    let table_rows: Vec<TicketTableRow> = rows.iter().map(TicketTableRow::from).collect();
    println!("{}", render_table(table_rows));
    let note = format_sort_note(board.view().sort_state());
    if !note.is_empty() {
        println!("{}", note.dimmed());
    }
    println!("{}", format_page_footer(&page));
    Ok(())
}

/// Show a ticket with its SLA as of now
pub async fn cmd_ticket_show(console: &Console, id: EntityId, output: OutputOptions) -> Result<()> {
    let board = console.ticket_board().await?;
    let detail = board.detail(id, Timestamp::now(), &TimeZone::system())?;

    CommandOutput::new(serde_json::to_value(&detail)?)
        .with_text(format_ticket_detail(&detail))
        .print(output)
}

/// Show a ticket and print its countdown every second until interrupted
pub async fn cmd_ticket_watch(console: &Console, id: EntityId, seconds: Option<u64>) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let tz = TimeZone::system();
    let clock = system_clock();
    let panel = board.open_detail(id, tz.clone(), clock.clone(), COUNTDOWN_PERIOD)?;
    let ticket = board.selected()?.clone();
    println!("{}", format_ticket_detail(&panel.detail));

    if panel.detail.allowance.is_none() {
        return Ok(());
    }

    let mut updates = panel.countdown.subscribe();
    let deadline = async {
        match seconds {
            Some(limit) => tokio::time::sleep(Duration::from_secs(limit)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = updates.borrow_and_update().clone();
                let overdue = matches!(
                    sla_status(&ticket, clock(), &tz),
                    Ok(SlaStatus::Remaining { overdue: true, .. })
                );
                println!("{}", format_sla_line(&line, overdue));
            }
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    debug!(ticket = id, "closing ticket detail");
    panel.close();
    Ok(())
}

/// Flags of `ticket create`.
pub struct TicketCreateOptions {
    pub title: String,
    pub description: String,
    pub customer: String,
    pub responsible: Option<String>,
    pub kind: TicketKind,
    pub severity: Option<EntityId>,
}

/// Pick one option by id or by a unique name prefix.
fn resolve<T>(
    what: &str,
    input: &str,
    all: &[T],
    matches: Vec<T>,
    id_of: fn(&T) -> EntityId,
    label: fn(&T) -> String,
) -> Result<EntityId> {
    if let Ok(id) = input.trim().parse::<EntityId>() {
        return all
            .iter()
            .find(|item| id_of(item) == id)
            .map(id_of)
            .ok_or_else(|| PsaError::NotFound(format!("{what} {id}")));
    }
    match matches.as_slice() {
        [only] => Ok(id_of(only)),
        [] => Err(PsaError::NotFound(format!("{what} '{input}'"))),
        several => Err(PsaError::MissingPrecondition(format!(
            "'{input}' matches several {what}s: {}",
            several.iter().map(label).collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Create a ticket in the selected version
pub async fn cmd_ticket_create(
    console: &Console,
    options: TicketCreateOptions,
    output: OutputOptions,
) -> Result<()> {
    let mut draft = TicketDraft::new(console.session())?;
    let refreshed = draft.refresh_options(console.support()).result().await;
    draft.apply_options(refreshed)?;

    draft.name = options.title;
    draft.description = options.description;

    let customer = resolve(
        "customer",
        &options.customer,
        &draft.options().customers,
        draft.customer_options(&options.customer),
        |c: &Customer| c.id,
        |c: &Customer| format!("{} (id {})", c.name, c.id),
    )?;
    draft.choose_customer(customer)?;

    let responsible = match &options.responsible {
        Some(input) => Some(resolve(
            "responsible",
            input,
            &draft.options().responsibles,
            draft.responsible_options(input),
            |r: &Responsible| r.id,
            |r: &Responsible| format!("{} (id {})", r.full_name(), r.id),
        )?),
        None => None,
    };
    draft.choose_responsible(responsible)?;

    draft.set_kind(options.kind);
    if let Some(severity) = options.severity {
        draft.choose_severity(severity)?;
    }
    draft.validate()?;

    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = draft.submit(&mut board, support.as_ref()).await?;

    let version = draft.version().label();
    CommandOutput::new(json!({
        "action": "ticket_create",
        "version": version,
        "reconciled": format!("{reconciled:?}").to_lowercase(),
        "success": true,
    }))
    .with_text(format!("Ticket creado en {}", version.cyan()))
    .print(output)
}

fn describe_row(row: Option<TicketRow>, id: EntityId) -> String {
    match row {
        Some(row) => format!(
            "Ticket {} updated: {} [{}]",
            format!("#{id}").cyan(),
            row.title,
            row.status
        ),
        None => format!(
            "Ticket {} updated; it no longer belongs to the selected version",
            format!("#{id}").cyan()
        ),
    }
}

fn report(
    board: &TicketBoard,
    action: &str,
    id: EntityId,
    reconciled: Reconciled,
    output: OutputOptions,
) -> Result<()> {
    let row = board
        .view()
        .visible()
        .iter()
        .find(|t| t.id == id)
        .map(|t| board.row(t));
    let mut json = mutation_json(action, id, reconciled);
    json["ticket"] = serde_json::to_value(&row)?;

    let text = match reconciled {
        Reconciled::Removed => format!("Ticket {} removed", format!("#{id}").cyan()),
        _ => describe_row(row, id),
    };
    CommandOutput::new(json).with_text(text).print(output)
}

pub async fn cmd_ticket_status(
    console: &Console,
    id: EntityId,
    status: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .set_status(id, status)
        .await?;
    report(&board, "ticket_status", id, reconciled, output)
}

pub async fn cmd_ticket_severity(
    console: &Console,
    id: EntityId,
    kind: TicketKind,
    severity: Option<EntityId>,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .set_severity(id, kind, severity)
        .await?;
    report(&board, "ticket_severity", id, reconciled, output)
}

pub async fn cmd_ticket_customer(
    console: &Console,
    id: EntityId,
    customer: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .set_customer(id, customer)
        .await?;
    report(&board, "ticket_customer", id, reconciled, output)
}

/// Set the responsible, or remove it when `responsible` is `None`
pub async fn cmd_ticket_responsible(
    console: &Console,
    id: EntityId,
    responsible: Option<EntityId>,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let mut panel = TicketPanel::new(&mut board, support.as_ref());
    let reconciled = match responsible {
        Some(responsible) => panel.set_responsible(id, responsible).await?,
        None => panel.remove_responsible(id).await?,
    };
    report(&board, "ticket_responsible", id, reconciled, output)
}

pub async fn cmd_ticket_rename(
    console: &Console,
    id: EntityId,
    title: &str,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .rename(id, title)
        .await?;
    report(&board, "ticket_rename", id, reconciled, output)
}

pub async fn cmd_ticket_describe(
    console: &Console,
    id: EntityId,
    description: &str,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .describe(id, description)
        .await?;
    report(&board, "ticket_describe", id, reconciled, output)
}

pub async fn cmd_ticket_move(
    console: &Console,
    id: EntityId,
    version: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .move_version(id, version)
        .await?;
    report(&board, "ticket_move", id, reconciled, output)
}

pub async fn cmd_ticket_delete(
    console: &Console,
    id: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .delete(id)
        .await?;
    report(&board, "ticket_delete", id, reconciled, output)
}

pub async fn cmd_ticket_derive(
    console: &Console,
    id: EntityId,
    project: EntityId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = console.ticket_board().await?;
    let support = console.support();
    let reconciled = TicketPanel::new(&mut board, support.as_ref())
        .derive(id, project)
        .await?;

    let mut json = mutation_json("ticket_derive", id, reconciled);
    json["project"] = json!(project);
    CommandOutput::new(json)
        .with_text(format!(
            "Ticket {} derived to project {}",
            format!("#{id}").cyan(),
            project
        ))
        .print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Vec<Customer> {
        ["Acme", "Acero", "Bacon"]
            .iter()
            .enumerate()
            .map(|(i, name)| Customer {
                id: i as EntityId + 1,
                name: name.to_string(),
                cuit: None,
            })
            .collect()
    }

    fn pick(input: &str, matches: &[&str]) -> Result<EntityId> {
        let all = customers();
        let matched: Vec<Customer> = all
            .iter()
            .filter(|c| matches.contains(&c.name.as_str()))
            .cloned()
            .collect();
        resolve(
            "customer",
            input,
            &all,
            matched,
            |c: &Customer| c.id,
            |c: &Customer| c.name.clone(),
        )
    }

    #[test]
    fn test_resolve_by_id() {
        assert_eq!(pick("3", &[]).unwrap(), 3);
        assert!(matches!(pick("9", &[]), Err(PsaError::NotFound(_))));
    }

    #[test]
    fn test_resolve_by_unique_prefix() {
        assert_eq!(pick("acm", &["Acme"]).unwrap(), 1);
        assert!(matches!(pick("zz", &[]), Err(PsaError::NotFound(_))));
        let err = pick("ac", &["Acme", "Acero"]).unwrap_err();
        assert!(err.to_string().contains("Acme, Acero"));
    }
}
