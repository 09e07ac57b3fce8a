#[macro_use]
mod macros;

pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod console;
pub mod debounce;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod remote;
pub mod session;
pub mod sla;
pub mod types;
pub mod utils;
pub mod views;

pub use console::Console;
pub use error::{PsaError, Result};
pub use types::{Customer, EntityId, Project, Responsible, Task, Ticket, TicketKind, Version};
