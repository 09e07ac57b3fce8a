use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use psa_console::Result;
use psa_console::cli::{
    Cli, Commands, ConfigAction, OutputOptions, ProjectAction, TaskAction, TicketAction,
    VersionAction,
};
use psa_console::commands::{
    TicketCreateOptions, cmd_config_get, cmd_config_set, cmd_config_show, cmd_project_create,
    cmd_project_ls, cmd_task_assign, cmd_task_create, cmd_task_delete, cmd_task_ls,
    cmd_task_show, cmd_task_status, cmd_ticket_create, cmd_ticket_customer, cmd_ticket_delete,
    cmd_ticket_derive, cmd_ticket_describe, cmd_ticket_ls, cmd_ticket_move, cmd_ticket_rename,
    cmd_ticket_responsible, cmd_ticket_severity, cmd_ticket_show, cmd_ticket_status,
    cmd_ticket_watch, cmd_version_clear, cmd_version_ls, cmd_version_select, cmd_version_show,
};
use psa_console::console::Console;

fn json(json: bool) -> OutputOptions {
    OutputOptions { json }
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json: j } => cmd_config_show(json(j)),
        ConfigAction::Set { key, value, json: j } => cmd_config_set(&key, &value, json(j)),
        ConfigAction::Get { key, json: j } => cmd_config_get(&key, json(j)),
    }
}

async fn run(command: Commands) -> Result<()> {
    // Configuration commands must work before the service URLs are set.
    if let Commands::Config { action } = command {
        return run_config(action);
    }
    let console = Console::open()?;
    run_with_console(&console, command).await
}

async fn run_with_console(console: &Console, command: Commands) -> Result<()> {
    match command {
        Commands::Config { action } => run_config(action),

        Commands::Version { action } => match action {
            VersionAction::Ls { list } => cmd_version_ls(console, &list).await,
            VersionAction::Select { id, json: j } => cmd_version_select(console, id, json(j)).await,
            VersionAction::Show { json: j } => cmd_version_show(console, json(j)),
            VersionAction::Clear { json: j } => cmd_version_clear(console, json(j)),
        },

        Commands::Ticket { action } => match action {
            TicketAction::Ls { list } => cmd_ticket_ls(console, &list).await,
            TicketAction::Show { id, json: j } => cmd_ticket_show(console, id, json(j)).await,
            TicketAction::Watch { id, seconds } => cmd_ticket_watch(console, id, seconds).await,
            TicketAction::Create {
                title,
                description,
                customer,
                responsible,
                kind,
                severity,
                json: j,
            } => {
                cmd_ticket_create(
                    console,
                    TicketCreateOptions {
                        title,
                        description,
                        customer,
                        responsible,
                        kind,
                        severity,
                    },
                    json(j),
                )
                .await
            }
            TicketAction::Status { id, status, json: j } => {
                cmd_ticket_status(console, id, status, json(j)).await
            }
            TicketAction::Severity {
                id,
                kind,
                severity,
                json: j,
            } => cmd_ticket_severity(console, id, kind, severity, json(j)).await,
            TicketAction::Customer {
                id,
                customer,
                json: j,
            } => cmd_ticket_customer(console, id, customer, json(j)).await,
            TicketAction::Responsible {
                id,
                responsible,
                remove,
                json: j,
            } => {
                let responsible = if remove { None } else { responsible };
                cmd_ticket_responsible(console, id, responsible, json(j)).await
            }
            TicketAction::Rename { id, title, json: j } => {
                cmd_ticket_rename(console, id, &title, json(j)).await
            }
            TicketAction::Describe {
                id,
                description,
                json: j,
            } => cmd_ticket_describe(console, id, &description, json(j)).await,
            TicketAction::Move { id, version, json: j } => {
                cmd_ticket_move(console, id, version, json(j)).await
            }
            TicketAction::Delete { id, json: j } => cmd_ticket_delete(console, id, json(j)).await,
            TicketAction::Derive { id, project, json: j } => {
                cmd_ticket_derive(console, id, project, json(j)).await
            }
        },

        Commands::Project { action } => match action {
            ProjectAction::Ls { list } => cmd_project_ls(console, &list).await,
            ProjectAction::Create { fields } => cmd_project_create(console, &fields).await,
        },

        Commands::Task { action } => match action {
            TaskAction::Ls { project, list } => cmd_task_ls(console, project, &list).await,
            TaskAction::Show { id, json: j } => cmd_task_show(console, id, json(j)).await,
            TaskAction::Create { project, fields } => {
                cmd_task_create(console, project, &fields).await
            }
            TaskAction::Status { id, status, json: j } => {
                cmd_task_status(console, id, &status, json(j)).await
            }
            TaskAction::Assign {
                id,
                assignee,
                json: j,
            } => cmd_task_assign(console, id, &assignee, json(j)).await,
            TaskAction::Delete { id, json: j } => cmd_task_delete(console, id, json(j)).await,
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
