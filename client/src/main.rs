// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use client::api::ApiClient;
use client::auth::AuthContext;
use client::board::FormField;
use client::dashboard::{Dashboard, DragOutcome};
use client::login::{LOGIN_SUCCESS_MESSAGE, LoginForm};
use client::render::render_board;
use common::{Priority, TaskStatus};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(
    name = "taskboard",
    version,
    about = "Terminal dashboard for the task board.",
    long_about = "Log in against the task board server, then list, add, edit, move and delete tasks. The session token is kept in a local file between runs."
)]
struct Cli {
    /// Base URL of the task board server
    #[arg(long, global = true, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Where the session token is stored
    #[arg(long, global = true, env = "TASKBOARD_TOKEN_FILE")]
    token_file: Option<PathBuf>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the session token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Show the board
    Board,
    /// Add a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        assigned_to: String,
        /// YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due_date: String,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Edit a task; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Move a task to another column (todo, in-progress, done)
    Move { id: i64, status: TaskStatus },
    /// Delete a task
    Delete { id: i64 },
}

fn default_token_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".taskboard").join("token"),
        None => PathBuf::from(".taskboard-token"),
    }
}

/// Loads the board and fails with its error line if that did not work.
async fn load_board(dashboard: &Dashboard<ApiClient>) -> anyhow::Result<()> {
    dashboard.load().await?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let token_file = cli.token_file.unwrap_or_else(default_token_file);
    let auth = AuthContext::with_token_file(&token_file)
        .with_context(|| format!("Failed to read token file {}", token_file.display()))?;
    let api = ApiClient::new(&cli.api_url, auth.clone())?;

    if !matches!(cli.command, Commands::Login { .. }) && !auth.is_authenticated() {
        bail!("Not logged in. Run `taskboard login --email <EMAIL> --password <PASSWORD>` first.");
    }

    match cli.command {
        Commands::Login { email, password } => {
            let mut form = LoginForm::new(&email, &password);
            match form.submit(&api).await {
                Some(response) => {
                    let name = response.user.map(|u| u.username).unwrap_or_default();
                    println!("{} Welcome, {}.", LOGIN_SUCCESS_MESSAGE.green(), name.bold());
                }
                None => bail!(form.error.unwrap_or_default()),
            }
        }
        Commands::Logout => {
            api.logout().await?;
            println!("Logged out.");
        }
        Commands::Whoami => {
            let session = api.verify().await?;
            println!(
                "{} <{}> ({})",
                session.user.username.bold(),
                session.user.email,
                session.user.role.as_str()
            );
        }
        Commands::Board => {
            let dashboard = Dashboard::new(api);
            load_board(&dashboard).await?;
            println!("{}", render_board(&dashboard.snapshot()));
        }
        Commands::Add {
            title,
            assigned_to,
            due_date,
            status,
            priority,
        } => {
            let dashboard = Dashboard::new(api);
            dashboard.open_create();
            dashboard.edit_field(FormField::Title(title));
            dashboard.edit_field(FormField::AssignedTo(assigned_to));
            dashboard.edit_field(FormField::DueDate(due_date));
            dashboard.edit_field(FormField::Status(status));
            dashboard.edit_field(FormField::Priority(priority));
            let task = dashboard.submit_form().await?;
            println!("Added task #{}: {}", task.id, task.title.bold());
        }
        Commands::Edit {
            id,
            title,
            assigned_to,
            due_date,
            status,
            priority,
        } => {
            let dashboard = Dashboard::new(api);
            load_board(&dashboard).await?;
            dashboard.open_edit(id);
            if dashboard.snapshot().editing != Some(id) {
                bail!("Task with ID {id} not found.");
            }
            let edits = [
                title.map(FormField::Title),
                assigned_to.map(FormField::AssignedTo),
                due_date.map(FormField::DueDate),
                status.map(FormField::Status),
                priority.map(FormField::Priority),
            ];
            for field in edits.into_iter().flatten() {
                dashboard.edit_field(field);
            }
            let task = dashboard.submit_form().await?;
            println!("Updated task #{}: {}", task.id, task.title.bold());
        }
        Commands::Move { id, status } => {
            let dashboard = Dashboard::new(api);
            load_board(&dashboard).await?;
            if dashboard.snapshot().task(id).is_none() {
                bail!("Task with ID {id} not found.");
            }
            match dashboard.drag_end(id, Some(status)).await? {
                DragOutcome::Committed => println!("Moved task #{} to {}.", id, status.title()),
                DragOutcome::Unchanged => println!("Task #{} is already in {}.", id, status.title()),
            }
        }
        Commands::Delete { id } => {
            let dashboard = Dashboard::new(api);
            dashboard.delete_task(id).await?;
            println!("Deleted task #{id}.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Lets TASKBOARD_* settings come from a .env file.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    if cli.no_color {
        yansi::disable();
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
