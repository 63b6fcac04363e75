use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Outcome, RestBackend, TodoListController, TodoRepository};
use shared::domain::TodoId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Manage the to-do list of the signed-in user")]
struct Cli {
    /// TOML settings file (defaults to ./todo.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Fields left out keep their current values.
    Update {
        id: i64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let backend = Arc::new(
        RestBackend::new(settings.service_config()?).context("failed to build backend client")?,
    );
    let repository = TodoRepository::with_table_name(backend.clone(), settings.table.as_str());
    let todos = TodoListController::with_repository(backend, repository);

    if let Outcome::Skipped(_) = todos.load().await? {
        warn!("no authenticated session; set SUPABASE_ACCESS_TOKEN to see your todos");
    }

    match cli.command {
        Command::List => {}
        Command::Create {
            subject,
            description,
        } => {
            todos.set_draft_subject(subject).await;
            todos.set_draft_description(description).await;
            match todos.create().await? {
                Outcome::Applied(item) => info!(todo_id = %item.id, "created"),
                Outcome::Skipped(reason) => bail!("todo was not created: {reason:?}"),
            }
        }
        Command::Update {
            id,
            subject,
            description,
        } => {
            todos.begin_edit(TodoId(id)).await?;
            if let Some(subject) = subject {
                todos.set_edit_subject(subject).await;
            }
            if let Some(description) = description {
                todos.set_edit_description(description).await;
            }
            if let Outcome::Applied(item) = todos.update().await? {
                info!(todo_id = %item.id, "updated");
            }
        }
        Command::Delete { id } => {
            if let Outcome::Applied(false) = todos.delete(TodoId(id)).await? {
                warn!(todo_id = id, "todo was not in your list");
            }
        }
    }

    print!("{}", render::render_table(&todos.rows().await));
    Ok(())
}
