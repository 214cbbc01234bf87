//! todos CLI - task tracking server and client.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use todos::api::{self, AppState};
use todos::{ApiClient, ApiFailure, DatabaseTarget, ServerConfig, StoreHandle, Task, TaskPatch};

mod browse;
mod cli;

use browse::format_status;
use cli::{Cli, Command};

fn setup_logging(to_stderr: bool) -> Result<()> {
    if to_stderr {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return Ok(());
    }

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todos")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("todos.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_task(task: &Task) {
    println!("{}: {}", "ID".bold(), task.id.cyan());
    println!("{}: {}", "Title".bold(), task.title);
    println!("{}: {}", "Description".bold(), task.description);
    println!("{}: {}", "Status".bold(), format_status(&task.status));
    println!("{}: {}", "Created".bold(), task.created_at);
}

async fn serve(host: Option<std::net::IpAddr>, port: Option<u16>, db: Option<String>) -> Result<()> {
    let mut config = ServerConfig::from_env().context("Invalid server configuration")?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(db) = db {
        config.database = DatabaseTarget::parse(&db);
    }

    info!("Opening store at {}", config.database);
    let store = config.database.open()?;
    let handle = StoreHandle::spawn(store)?;

    println!(
        "{} Serving on http://{} (store: {})",
        "→".blue(),
        config.socket_addr(),
        config.database
    );
    api::serve(config.socket_addr(), AppState::new(handle)).await
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port, db } => serve(host, port, db).await,
        command => run_client(&cli.url, command).await,
    }
}

async fn run_client(url: &str, command: Command) -> Result<()> {
    let client = ApiClient::new(url)?;

    match command {
        Command::Serve { .. } => eyre::bail!("serve is not a client command"),

        Command::List { status, page } => {
            let body = client.list(status, page).await?;

            if body.todos.is_empty() {
                println!("{}", "No tasks found".dimmed());
            } else {
                for task in &body.todos {
                    println!(
                        "{} {} {}\n    {}",
                        format_status(&task.status),
                        task.id.cyan(),
                        task.title,
                        task.description.dimmed()
                    );
                }
            }
            println!(
                "{}",
                format!(
                    "Page {} of {} ({} tasks)",
                    body.page,
                    body.total_pages.max(1),
                    body.total_items
                )
                .dimmed()
            );
        }

        Command::Get { id } => match client.get(&id).await {
            Ok(task) => print_task(&task),
            Err(e) if ApiFailure::find(&e).is_some_and(ApiFailure::is_not_found) => {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
            Err(e) => return Err(e),
        },

        Command::Add {
            title,
            description,
            status,
        } => {
            let task = client.create(&title, &description, status).await?;
            println!("{} Created: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::Edit {
            id,
            title,
            description,
            status,
        } => {
            let patch = TaskPatch {
                title,
                description,
                status,
            };
            if patch.is_empty() {
                eyre::bail!("Nothing to change: pass --title, --description or --status");
            }
            let task = client.update(&id, &patch).await?;
            println!("{} Updated: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::Done { id } => {
            let patch = TaskPatch {
                status: Some(todos::Status::Completed),
                ..Default::default()
            };
            let task = client.update(&id, &patch).await?;
            println!("{} Completed: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::Rm { id } => {
            let message = client.delete(&id).await?;
            println!("{} {}: {}", "✓".green(), message, id.cyan());
        }

        Command::Browse => browse::run(client).await?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_stderr).context("Failed to setup logging")?;
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
