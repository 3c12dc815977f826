//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tasksync - offline-first task list with background remote sync
#[derive(Parser, Debug)]
#[command(name = "tasksync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/tasksync/config.yaml)
    #[arg(short, long, global = true, env = "TASKSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the simulated remote latency in milliseconds
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,

    /// Print sync metrics in Prometheus text format before exiting
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    #[command(flatten)]
    Task(TaskCommands),
}

/// Commands that run against the task repository
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks in local storage
    List {
        /// Only show tasks that are not completed
        #[arg(short, long)]
        active: bool,

        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Mark a task completed
    Complete {
        /// Task ID
        id: String,
    },

    /// Replace local tasks with the remote collection
    Refresh,

    /// Print the task list every time it changes
    Watch,
}
