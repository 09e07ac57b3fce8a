use clap::{Args, Parser, Subcommand};

use crate::types::{EntityId, TicketKind};

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Parser)]
#[command(name = "psa")]
#[command(about = "Administrative console for the PSA project and support services")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Choose the product version the ticket commands work on
    #[command(visible_alias = "v")]
    Version {
        #[command(subcommand)]
        action: VersionAction,
    },

    /// Support tickets of the selected version
    #[command(visible_alias = "t")]
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },

    /// Projects
    #[command(visible_alias = "p")]
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Project tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

/// Search, sort and paging flags shared by listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Show only rows whose searched field contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort column (see each command's help for the column names)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value (support.url, project.url, remote.timeout)
    Set {
        key: String,
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one configuration value
    Get {
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum VersionAction {
    /// List versions. Columns: id, product, name
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Select the version ticket commands operate on
    Select {
        id: EntityId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the selected version
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the selected version
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TicketAction {
    /// List tickets. Columns: id, name, time, customer, kind, severity,
    /// status, responsible. Search matches the description
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show a ticket with its SLA
    Show {
        id: EntityId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a ticket and keep its SLA countdown running
    Watch {
        id: EntityId,
        /// Stop after this many seconds (default: until interrupted)
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Create a ticket in the selected version
    Create {
        /// Ticket title
        #[arg(long)]
        title: String,
        /// Description text
        #[arg(short, long, default_value = "")]
        description: String,
        /// Customer id or the start of its name
        #[arg(short, long)]
        customer: String,
        /// Responsible id or the start of their name
        #[arg(short, long)]
        responsible: Option<String>,
        /// Ticket type: error or consulta
        #[arg(short = 't', long = "type", value_parser = parse_kind)]
        kind: TicketKind,
        /// Severity id (error tickets only)
        #[arg(long)]
        severity: Option<EntityId>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a ticket's status
    Status {
        id: EntityId,
        status: EntityId,
        #[arg(long)]
        json: bool,
    },
    /// Change a ticket's type and severity
    Severity {
        id: EntityId,
        /// Ticket type: error or consulta
        #[arg(short = 't', long = "type", value_parser = parse_kind)]
        kind: TicketKind,
        /// Severity id (required for error tickets)
        #[arg(long)]
        severity: Option<EntityId>,
        #[arg(long)]
        json: bool,
    },
    /// Reassign a ticket to another customer of its version
    Customer {
        id: EntityId,
        customer: EntityId,
        #[arg(long)]
        json: bool,
    },
    /// Set or remove a ticket's responsible
    Responsible {
        id: EntityId,
        #[arg(required_unless_present = "remove")]
        responsible: Option<EntityId>,
        /// Remove the current responsible
        #[arg(long, conflicts_with = "responsible")]
        remove: bool,
        #[arg(long)]
        json: bool,
    },
    /// Change a ticket's title
    Rename {
        id: EntityId,
        title: String,
        #[arg(long)]
        json: bool,
    },
    /// Replace a ticket's description
    Describe {
        id: EntityId,
        description: String,
        #[arg(long)]
        json: bool,
    },
    /// Move a ticket to another version
    Move {
        id: EntityId,
        version: EntityId,
        #[arg(long)]
        json: bool,
    },
    /// Delete a ticket
    Delete {
        id: EntityId,
        #[arg(long)]
        json: bool,
    },
    /// Link a ticket to a project as a task
    Derive {
        id: EntityId,
        project: EntityId,
        #[arg(long)]
        json: bool,
    },
}

/// Fields of the project and task creation forms.
#[derive(Args, Debug, Clone)]
pub struct WorkItemArgs {
    /// Name
    #[arg(long)]
    pub name: String,
    /// Description text
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Start date: YYYY/MM/DD, YYYY-MM-DD or an ISO datetime
    #[arg(long)]
    pub start: String,
    /// End date: YYYY/MM/DD, YYYY-MM-DD or an ISO datetime
    #[arg(long)]
    pub end: String,
    /// Hours already consumed
    #[arg(long, default_value_t = 0.0)]
    pub hours: f64,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects. Columns: id, name, description, startdate, enddate
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a project
    Create {
        #[command(flatten)]
        fields: WorkItemArgs,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks. Columns: id, name, description, priority, status,
    /// startdate, enddate, consumedhours. Search matches the name
    Ls {
        /// Only tasks of this project
        #[arg(long)]
        project: Option<EntityId>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show a task
    Show {
        id: EntityId,
        #[arg(long)]
        json: bool,
    },
    /// Create a task under a project
    Create {
        /// Project id
        #[arg(long)]
        project: EntityId,
        #[command(flatten)]
        fields: WorkItemArgs,
    },
    /// Change a task's status (one of the statuses seen on loaded tasks)
    Status {
        id: EntityId,
        /// Status id or name
        status: String,
        #[arg(long)]
        json: bool,
    },
    /// Change a task's assignee
    Assign {
        id: EntityId,
        assignee: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a task
    Delete {
        id: EntityId,
        #[arg(long)]
        json: bool,
    },
}

fn parse_kind(s: &str) -> Result<TicketKind, String> {
    s.parse()
        .map_err(|_| "Invalid type. Must be one of: error, consulta".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_args_parse() {
        let cli = Cli::try_parse_from([
            "psa", "ticket", "ls", "--search", "login", "--sort", "customer", "--desc", "-p", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Ticket {
                action: TicketAction::Ls { list },
            } => {
                assert_eq!(list.search.as_deref(), Some("login"));
                assert_eq!(list.sort.as_deref(), Some("customer"));
                assert!(list.desc);
                assert_eq!(list.page, 2);
            }
            _ => panic!("expected ticket ls"),
        }
    }

    #[test]
    fn test_ticket_type_is_validated() {
        assert!(
            Cli::try_parse_from([
                "psa", "ticket", "create", "--title", "x", "--customer", "1", "--type", "bug",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "psa", "ticket", "create", "--title", "x", "--customer", "1", "--type", "Consulta",
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_responsible_needs_id_or_remove() {
        assert!(Cli::try_parse_from(["psa", "ticket", "responsible", "4"]).is_err());
        assert!(Cli::try_parse_from(["psa", "ticket", "responsible", "4", "--remove"]).is_ok());
        assert!(Cli::try_parse_from(["psa", "ticket", "responsible", "4", "7"]).is_ok());
    }
}
