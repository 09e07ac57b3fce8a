//! Severity-based resolution deadlines for error tickets.
//!
//! Each error severity grants a fixed number of days from the ticket's
//! creation time. Inquiry tickets (and unknown severities) have no deadline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, ToSpan};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::{PsaError, Result};
use crate::types::{EntityId, Ticket};
use crate::utils::parse_instant;

/// Message shown instead of a countdown for tickets without a deadline.
pub const INQUIRY_MESSAGE: &str = "Ticket del tipo consulta";

/// How often an open detail panel recomputes the countdown.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

const SECONDS_PER_DAY: i64 = 86_400;

/// Days granted to resolve a ticket of a given severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaAllowance {
    days: i64,
}

impl SlaAllowance {
    pub fn for_severity(severity_id: EntityId) -> Option<Self> {
        let days = match severity_id {
            1 => 7,
            2 => 30,
            3 => 90,
            4 => 365,
            _ => return None,
        };
        Some(Self { days })
    }

    pub fn for_ticket(ticket: &Ticket) -> Option<Self> {
        if ticket.severity.is_inquiry() {
            return None;
        }
        Self::for_severity(ticket.severity.id)
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn label(&self) -> String {
        format!("Tiempo según severidad: {} días", self.days)
    }
}

/// A non-negative span broken into whole days, hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub fn from_seconds(total: i64) -> Self {
        let total = total.abs();
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} días, {} horas, {} minutos y {} segundos",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    /// Distance to the deadline. `overdue` is set once the deadline passed;
    /// the span itself is always the absolute distance.
    Remaining { remaining: Remaining, overdue: bool },
    Inquiry,
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaStatus::Remaining { remaining, .. } => write!(f, "Tiempo restante: {remaining}"),
            SlaStatus::Inquiry => f.write_str(INQUIRY_MESSAGE),
        }
    }
}

/// Instant the ticket's allowance runs out, or `None` for inquiries.
pub fn due_instant(ticket: &Ticket, tz: &TimeZone) -> Result<Option<Timestamp>> {
    let Some(allowance) = SlaAllowance::for_ticket(ticket) else {
        return Ok(None);
    };
    let opened = parse_instant(&ticket.time, tz)?;
    let due = opened
        .checked_add(SignedDuration::from_secs(allowance.days() * SECONDS_PER_DAY))
        .map_err(|e| PsaError::InvalidDate(ticket.time.clone(), e.to_string()))?;
    Ok(Some(due))
}

pub fn sla_status(ticket: &Ticket, now: Timestamp, tz: &TimeZone) -> Result<SlaStatus> {
    let Some(due) = due_instant(ticket, tz)? else {
        return Ok(SlaStatus::Inquiry);
    };
    let delta = due.as_second() - now.as_second();
    Ok(SlaStatus::Remaining {
        remaining: Remaining::from_seconds(delta),
        overdue: delta < 0,
    })
}

/// "Fecha de finalizacion: YYYY-MM-DD HH:MM:SS" for error tickets.
///
/// The date portion of `time` is advanced by whole calendar days and the
/// original time-of-day text is re-appended unchanged.
pub fn due_date_label(ticket: &Ticket) -> Result<Option<String>> {
    let Some(allowance) = SlaAllowance::for_ticket(ticket) else {
        return Ok(None);
    };
    let date_part = ticket.time.get(0..10).unwrap_or(&ticket.time);
    let date: Date = date_part
        .parse()
        .map_err(|e: jiff::Error| PsaError::InvalidDate(ticket.time.clone(), e.to_string()))?;
    let due = date
        .checked_add(allowance.days().days())
        .map_err(|e| PsaError::InvalidDate(ticket.time.clone(), e.to_string()))?;

    let label = match ticket.time.get(11..19) {
        Some(clock) => format!("Fecha de finalizacion: {due} {clock}"),
        None => format!("Fecha de finalizacion: {due}"),
    };
    Ok(Some(label))
}

/// Source of "now" for countdowns.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Timestamp::now)
}

fn render(ticket: &Ticket, now: Timestamp, tz: &TimeZone) -> String {
    match sla_status(ticket, now, tz) {
        Ok(status) => status.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Live countdown for an open ticket detail panel.
///
/// Recomputes the remaining time once per period on a background task and
/// publishes the rendered line through a watch channel. The task is aborted
/// when the countdown is stopped or dropped, so closing the panel releases it.
pub struct SlaCountdown {
    rx: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl SlaCountdown {
    pub fn start(ticket: Ticket, tz: TimeZone, clock: Clock, period: Duration) -> Self {
        let (tx, rx) = watch::channel(render(&ticket, clock(), &tz));
        debug!(ticket = ticket.id, "starting SLA countdown");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(render(&ticket, clock(), &tz)).is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Latest rendered line.
    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }

    pub fn stop(self) {}
}

impl Drop for SlaCountdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
