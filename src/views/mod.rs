//! The console's tables and option panels, each a [`CollectionView`]
//! instantiation.
//!
//! [`CollectionView`]: crate::collection::CollectionView

pub mod drafts;
pub mod projects;
pub mod task_panel;
pub mod ticket_panel;
pub mod tickets;
pub mod versions;

pub use drafts::{DraftOptions, ProjectDraft, TaskDraft, TicketDraft, WorkItemFields};
pub use projects::{ProjectBoard, ProjectColumn, TaskAction, TaskColumn};
pub use task_panel::TaskPanel;
pub use ticket_panel::TicketPanel;
pub use tickets::{
    TICKET_PAGE_SIZE, TicketAction, TicketBoard, TicketColumn, TicketDetail, TicketDetailPanel,
    TicketRow,
};
pub use versions::{VERSION_PAGE_SIZE, VersionColumn, VersionPicker};
