//! CLI argument parsing for todos.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use todos::Status;
use todos::client::DEFAULT_BASE_URL;

#[derive(Parser)]
#[command(
    name = "todos",
    about = "Task tracking REST service and terminal client",
    version,
    after_help = "Logs are written to: ~/.local/share/todos/logs/todos.log"
)]
pub struct Cli {
    /// Base URL of the todos server used by client commands
    #[arg(short = 'u', long, global = true, env = "TODOS_URL", default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (reads HOST, PORT and DATABASE_URL)
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite file, or ":memory:" (overrides DATABASE_URL)
        #[arg(long)]
        db: Option<String>,
    },

    /// List tasks, newest first
    List {
        /// Filter by status (pending, completed)
        #[arg(short, long)]
        status: Option<Status>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show a task by ID
    Get {
        /// Task ID
        id: String,
    },

    /// Create a new task
    Add {
        /// Task title
        title: String,

        /// Description
        #[arg(short = 'D', long)]
        description: String,

        /// Initial status (pending, completed)
        #[arg(short, long, default_value = "pending")]
        status: Status,
    },

    /// Change fields of a task
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// New status (pending, completed)
        #[arg(short, long)]
        status: Option<Status>,
    },

    /// Mark a task completed
    Done {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },

    /// Interactive list with filter, paging and editing
    Browse,
}
