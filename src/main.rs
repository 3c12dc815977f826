//! tasksync CLI
//!
//! Main entry point for the tasksync binary.

mod commands;

use clap::Parser;
use commands::{Cli, Commands, TaskCommands};
use futures::StreamExt;
use std::process;
use std::sync::Arc;
use task_network::FakeNetworkDataSource;
use tasksync::config::{validate_config_result, TaskSyncConfig};
use tasksync::storage::TaskDatabase;
use tasksync::sync::{metrics, Dispatcher, SyncEvent, SyncScope};
use tasksync::{Task, TaskId, TaskRepository, TaskSyncError};
use tokio::runtime::Handle;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = tasksync::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> tasksync::Result<()> {
    // Handle init command first (creates config)
    let command = match cli.command {
        Commands::Init { force } => return handle_init_command(cli.config.as_deref(), force),
        Commands::Task(command) => command,
    };

    let mut config = TaskSyncConfig::load_or_default(cli.config.as_deref())?;
    if let Some(latency_ms) = cli.latency_ms {
        config.remote.latency_ms = latency_ms;
    }
    validate_config_result(&config)?;

    let db = TaskDatabase::open(&config.database)?;

    let mut remote = FakeNetworkDataSource::new().with_latency(config.remote.latency());
    if let Some(ref backing_file) = config.remote.backing_file {
        remote = remote.with_backing_file(backing_file).await?;
    }

    let scope = SyncScope::new(Handle::current(), config.sync.event_channel_capacity);
    let repo = TaskRepository::new(
        Arc::new(db.task_dao()),
        Arc::new(remote),
        Dispatcher::current(),
        scope.clone(),
    );

    let result = execute(&repo, command).await;

    let grace = config.sync.shutdown_grace();
    if scope.stats().in_flight > 0 {
        println!("Waiting for background sync to finish...");
    }
    let stats = scope.shutdown(grace).await;
    tracing::info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        aborted = stats.aborted,
        "Sync scope shut down"
    );
    if stats.aborted > 0 {
        eprintln!(
            "Warning: {} background sync job(s) did not finish within {:?}",
            stats.aborted, grace
        );
    }

    if cli.metrics {
        print!("{}", metrics::encode_metrics()?);
    }

    result
}

async fn execute(repo: &TaskRepository, command: TaskCommands) -> tasksync::Result<()> {
    match command {
        TaskCommands::List { active, json } => {
            let mut tasks = repo.get_all().await?;
            if active {
                tasks.retain(Task::is_active);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_tasks(&tasks);
            }
        }

        TaskCommands::Add { title, description } => {
            let mut events = repo.scope().subscribe();
            let id = repo.create(title, description).await?;
            println!("Created task {}", id);
            report_push(&mut events).await;
        }

        TaskCommands::Complete { id } => {
            let mut events = repo.scope().subscribe();
            repo.complete(&TaskId::new(id.clone())).await?;
            println!("Completed task {}", id);
            report_push(&mut events).await;
        }

        TaskCommands::Refresh => {
            repo.refresh().await?;
            let tasks = repo.get_all().await?;
            println!("Refreshed {} tasks from remote", tasks.len());
        }

        TaskCommands::Watch => {
            let mut stream = repo.observe_all();
            loop {
                tokio::select! {
                    next = stream.next() => match next {
                        Some(tasks) => {
                            print_tasks(&tasks?);
                            println!();
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }

    Ok(())
}

fn handle_init_command(path: Option<&std::path::Path>, force: bool) -> tasksync::Result<()> {
    let path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(TaskSyncConfig::default_path);

    if path.exists() && !force {
        return Err(TaskSyncError::Config(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    let config = TaskSyncConfig::new();
    config.save(&path)?;

    println!("Created configuration at {}", path.display());
    println!("  Database: {}", config.database.path.display());
    Ok(())
}

/// Print the outcome of the push launched by the last write
async fn report_push(events: &mut broadcast::Receiver<SyncEvent>) {
    match next_outcome(events).await {
        Some(SyncEvent::JobSucceeded { elapsed, .. }) => {
            println!("Synced to remote in {:?}", elapsed);
        }
        Some(SyncEvent::JobFailed { message, .. }) => {
            eprintln!("Warning: remote sync failed: {}", message);
        }
        _ => {}
    }
}

/// Wait for the next job outcome, `None` once the scope is gone
async fn next_outcome(events: &mut broadcast::Receiver<SyncEvent>) -> Option<SyncEvent> {
    loop {
        match events.recv().await {
            Ok(event) => {
                if matches!(
                    event,
                    SyncEvent::JobSucceeded { .. } | SyncEvent::JobFailed { .. }
                ) {
                    return Some(event);
                }
            }
            // Small channels drop older events; the outcome may still follow
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Sync event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    println!("Found {} tasks:", tasks.len());
    println!();
    for task in tasks {
        let marker = if task.is_completed { "x" } else { " " };
        println!("[{}] {} {}", marker, task.id, task.title_for_list());
        if !task.description.is_empty() {
            println!("      {}", task.description);
        }
    }
}
