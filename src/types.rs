//! Records mirrored from the project and support services.
//!
//! These are read replicas: the console never validates them beyond what the
//! forms require, and every field the services may omit has a serde default.

use serde::{Deserialize, Serialize};

use crate::error::PsaError;

/// Directory (relative to the working directory) holding config and session.
pub const PSA_DIR: &str = ".psa";

/// Identifier type used by both services.
pub type EntityId = i64;

/// An entity that can be merged into a collection by id.
pub trait Record: Clone {
    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Severity {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

impl Severity {
    /// Name the support service uses for the "no severity" row.
    pub const INQUIRY_NAME: &'static str = "NA";
    pub const INQUIRY_ID: EntityId = 0;

    /// Inquiry tickets carry no SLA.
    pub fn is_inquiry(&self) -> bool {
        self.id == Self::INQUIRY_ID || self.name == Self::INQUIRY_NAME
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product: Product,
}

impl Version {
    /// "Product - version" banner text.
    pub fn label(&self) -> String {
        format!("{} - {}", self.product.name, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsible {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl Responsible {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub open_date: String,
    /// Creation timestamp; the SLA clock starts here.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub customer: EntityId,
    #[serde(default)]
    pub responsible: Option<EntityId>,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub status: Status,
}

impl Ticket {
    pub fn kind(&self) -> TicketKind {
        if self.severity.is_inquiry() {
            TicketKind::Inquiry
        } else {
            TicketKind::Error
        }
    }

    /// `time` as "YYYY-MM-DD HH:MM:SS" for table display.
    pub fn opened_label(&self) -> String {
        let date = self.time.get(0..10).unwrap_or(&self.time);
        match self.time.get(11..19) {
            Some(clock) => format!("{date} {clock}"),
            None => date.to_string(),
        }
    }
}

/// Error tickets carry an SLA; inquiries ("consulta") do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketKind {
    #[default]
    Error,
    Inquiry,
}

impl TicketKind {
    /// Label shown in the ticket table.
    pub fn label(&self) -> &'static str {
        match self {
            TicketKind::Error => "Error",
            TicketKind::Inquiry => "Consulta",
        }
    }
}

enum_display_fromstr!(
    TicketKind,
    PsaError::invalid_ticket_type,
    {
        Error => "error",
        Inquiry => "consulta",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub consumed_hours: f64,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub project: EntityId,
    #[serde(default)]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub consumed_hours: f64,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> EntityId {
                self.id
            }
        })+
    };
}

impl_record!(
    Status,
    Severity,
    Product,
    Version,
    Customer,
    Responsible,
    Ticket,
    Task,
    Project
);
