use owo_colors::OwoColorize;

use crate::collection::{PageInfo, SortState};
use crate::views::TicketDetail;

pub mod tables;

pub use tables::*;

/// Status badge coloured by how far along the status name reads.
pub fn format_status_colored(status: &str) -> String {
    let badge = format!("[{status}]");
    let lower = status.to_lowercase();
    if lower.contains("cerrad") || lower.contains("finaliz") || lower.contains("resuel") {
        badge.green().to_string()
    } else if lower.contains("proceso") || lower.contains("iniciad") {
        badge.cyan().to_string()
    } else if status.is_empty() {
        badge.dimmed().to_string()
    } else {
        badge.yellow().to_string()
    }
}

/// Date part (YYYY-MM-DD) of an ISO datetime; shorter strings pass through.
pub fn format_date_for_display(date_str: &str) -> String {
    date_str.get(..10).unwrap_or(date_str).to_string()
}

/// "Page 2 of 3 (47 rows)" plus the flag for the neighbouring pages.
pub fn format_page_footer(page: &PageInfo) -> String {
    let mut footer = format!(
        "Page {} of {} ({} rows)",
        page.number,
        page.page_count(),
        page.total
    );
    if page.has_previous() {
        footer.push_str(&format!("  previous: --page {}", page.number - 1));
    }
    if page.has_next() {
        footer.push_str(&format!("  next: --page {}", page.number + 1));
    }
    footer.dimmed().to_string()
}

/// "sorted by customer ↓", or nothing when unsorted.
pub fn format_sort_note<C: std::fmt::Display>(state: Option<SortState<C>>) -> String {
    match state {
        Some(state) => format!("sorted by {} {}", state.column, state.direction.arrow()),
        None => String::new(),
    }
}

/// Multi-line ticket detail panel.
pub fn format_ticket_detail(detail: &TicketDetail) -> String {
    let mut text = format!(
        "{} {}\n",
        format!("#{}", detail.id).cyan(),
        detail.title.bold()
    );
    text.push_str(&format!("Versión: {}\n", detail.version));
    text.push_str(&format!("Cliente: {}\n", detail.customer));
    text.push_str(&format!("Responsable: {}\n", detail.responsible));
    text.push_str(&format!(
        "Estado: {}\n",
        format_status_colored(&detail.status)
    ));
    text.push_str(&format!("Tipo: {}\n", detail.kind));
    if let Some(allowance) = &detail.allowance {
        text.push_str(&format!("{allowance}\n"));
    }
    text.push_str(&format!("{}\n", format_sla_line(&detail.remaining, detail.overdue)));
    if let Some(due) = &detail.due {
        text.push_str(&format!("{due}\n"));
    }
    if !detail.description.is_empty() {
        text.push_str(&format!("\n{}", detail.description));
    }
    text
}

/// The countdown line, red once the SLA has passed.
pub fn format_sla_line(line: &str, overdue: bool) -> String {
    if overdue {
        line.red().to_string()
    } else {
        line.to_string()
    }
}
