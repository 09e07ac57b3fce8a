//! Single-field JSON-patch documents sent to `PATCH /tickets/{id}` and
//! `PATCH /tasks/{id}`.

use serde::Serialize;

use crate::types::EntityId;

/// Content type both services expect on PATCH bodies.
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The full PATCH body: a list of operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct PatchDocument(Vec<PatchOperation>);

impl PatchDocument {
    pub fn replace(path: &str, value: impl Into<String>) -> Self {
        Self(vec![PatchOperation {
            op: PatchOp::Replace,
            path: path.to_string(),
            value: Some(value.into()),
        }])
    }

    pub fn remove(path: &str) -> Self {
        Self(vec![PatchOperation {
            op: PatchOp::Remove,
            path: path.to_string(),
            value: None,
        }])
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }
}

/// One editable field of a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketEdit {
    Status(EntityId),
    Severity(EntityId),
    Customer(EntityId),
    Responsible(EntityId),
    RemoveResponsible,
    Name(String),
    Description(String),
    Version(EntityId),
}

impl TicketEdit {
    pub fn to_patch(&self) -> PatchDocument {
        match self {
            TicketEdit::Status(id) => PatchDocument::replace("/status/id", id.to_string()),
            TicketEdit::Severity(id) => PatchDocument::replace("/severity/id", id.to_string()),
            TicketEdit::Customer(id) => PatchDocument::replace("/customer", id.to_string()),
            TicketEdit::Responsible(id) => PatchDocument::replace("/responsible", id.to_string()),
            TicketEdit::RemoveResponsible => PatchDocument::remove("/responsible"),
            TicketEdit::Name(name) => PatchDocument::replace("/name", name.as_str()),
            TicketEdit::Description(text) => PatchDocument::replace("/description", text.as_str()),
            TicketEdit::Version(id) => PatchDocument::replace("/version/id", id.to_string()),
        }
    }

    /// Short name used in logs.
    pub fn field(&self) -> &'static str {
        match self {
            TicketEdit::Status(_) => "status",
            TicketEdit::Severity(_) => "severity",
            TicketEdit::Customer(_) => "customer",
            TicketEdit::Responsible(_) | TicketEdit::RemoveResponsible => "responsible",
            TicketEdit::Name(_) => "name",
            TicketEdit::Description(_) => "description",
            TicketEdit::Version(_) => "version",
        }
    }
}

/// Editable task fields sent as a patch; other task edits use a full PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Status(EntityId),
}

impl TaskEdit {
    pub fn to_patch(&self) -> PatchDocument {
        match self {
            TaskEdit::Status(id) => PatchDocument::replace("/status/id", id.to_string()),
        }
    }
}
