use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerError, ControllerHandle, HttpTaskApi, ReorderFailurePolicy, TaskListController,
};
use shared::domain::{Task, TaskId};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_base_url};

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Keep a remote to-do list in order")]
struct Cli {
    /// Base URL of the task API; overrides the settings file and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, default_value = "todo.toml")]
    config: PathBuf,
    /// Restore the previous order when saving a reorder fails.
    #[arg(long)]
    reorder_rollback: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Toggle {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Drag the task at FROM and drop it at TO. Without TO the drop is
    /// cancelled.
    Move {
        from: usize,
        to: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if run(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Loads the list, applies the command and prints the result. `Ok(false)`
/// means the failure was already reported.
async fn run(cli: Cli) -> Result<bool> {
    let mut settings = load_settings(&cli.config);
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if cli.reorder_rollback {
        settings.reorder_failure = ReorderFailurePolicy::Rollback;
    }

    let base_url = prepare_base_url(&settings.api_base_url)?;
    let api = HttpTaskApi::new(base_url.clone(), settings.http_options())
        .context("failed to build http client")?;
    let controller = TaskListController::new(Arc::new(api))
        .with_reorder_failure_policy(settings.reorder_failure);
    let (handle, _worker) = ControllerHandle::spawn(controller);

    match handle.load().await {
        Ok(()) => {}
        // Remote failures were already logged by the controller.
        Err(ControllerError::Sync(_)) => return Ok(false),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to load tasks from {base_url}"))
        }
    }

    let outcome = match cli.command {
        Command::List => Ok(()),
        Command::Add { text } => handle.add(text.join(" ")).await.map(|_| ()),
        Command::Toggle { id } => handle.toggle(TaskId::new(id)).await,
        Command::Delete { id } => handle.delete(TaskId::new(id)).await,
        Command::Move { from, to } => handle.reorder(from, to).await,
    };

    for task in handle.tasks().await? {
        println!("{}", render_task(&task));
    }

    match outcome {
        Ok(()) => Ok(true),
        Err(ControllerError::Sync(_)) => Ok(false),
        Err(err) => {
            error!(error = %err, "todo: command rejected");
            Ok(false)
        }
    }
}

fn render_task(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    format!("{:>3} [{mark}] {}  ({})", task.position, task.text, task.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_position_mark_text_and_id() {
        let mut task = Task::new("64f0", "Buy milk", 2);
        assert_eq!(render_task(&task), "  2 [ ] Buy milk  (64f0)");
        task.completed = true;
        assert_eq!(render_task(&task), "  2 [x] Buy milk  (64f0)");
    }

    #[test]
    fn move_without_destination_parses() {
        let cli = Cli::try_parse_from(["todo", "move", "3"]).expect("parse");
        assert!(matches!(cli.command, Command::Move { from: 3, to: None }));
    }

    #[test]
    fn add_joins_words() {
        let cli = Cli::try_parse_from(["todo", "--reorder-rollback", "add", "Buy", "milk"])
            .expect("parse");
        assert!(cli.reorder_rollback);
        match cli.command {
            Command::Add { text } => assert_eq!(text.join(" "), "Buy milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_requires_text() {
        assert!(Cli::try_parse_from(["todo", "add"]).is_err());
    }

    #[tokio::test]
    async fn unreachable_api_fails_without_an_error_chain() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let cli = Cli::try_parse_from([
            "todo".to_string(),
            "--api-url".to_string(),
            format!("http://{addr}"),
            "--config".to_string(),
            "does-not-exist.toml".to_string(),
            "list".to_string(),
        ])
        .expect("parse");

        let succeeded = run(cli).await.expect("load failure is not an error");
        assert!(!succeeded);
    }

    #[tokio::test]
    async fn invalid_api_url_is_still_an_error() {
        let cli = Cli::try_parse_from([
            "todo",
            "--api-url",
            "http://[::1",
            "--config",
            "does-not-exist.toml",
            "list",
        ])
        .expect("parse");

        assert!(run(cli).await.is_err());
    }
}
