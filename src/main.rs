//! # FocusBoard
//!
//! A terminal productivity dashboard backed by a remote board API. Plan the
//! day's tasks on a kanban board, complete them with the time they took and
//! proof of the work, and review the accomplishments and statistics that
//! come out of it.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Run without arguments to open the board:
//!
//! ```bash
//! focusboard
//! # or explicitly
//! focusboard ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Global**
//! *   `q`: Quit
//! *   `v`: Cycle Board / Dashboard / Timeline / Accomplishments
//! *   `[` / `]`: Previous / next day
//! *   `r`: Reload
//!
//! **Board**
//! *   `h` / `l`: Select column, `j` / `k`: select task
//! *   `H` / `L`: Move the task to the neighbouring column
//! *   `1`-`4`: Move the task to a column
//! *   `a`: Add task, `e`: edit title, `d`: delete task
//!
//! **Timeline**
//! *   `f`: Cycle filter, `/`: search
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! focusboard add "Write report" --project 1 --estimate 90 --date 2025-06-01
//! focusboard list --date yesterday
//! focusboard move 12 in_progress
//! focusboard complete 12 --time 75 --challenges "API flaky" --attach "pr:Fix report:https://git.example/pr/3"
//! focusboard stats
//! focusboard summary 2025-06-01 2025-06-07
//! ```
//!
//! ## Configuration
//!
//! Settings live in `~/.config/focusboard/config.json` (override with
//! `FOCUSBOARD_CONFIG`). `FOCUSBOARD_API_URL` overrides the API base URL and
//! `FOCUSBOARD_LOG` takes a `tracing` filter. The TUI logs to
//! `~/.local/share/focusboard/focusboard.log`.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use focusboard::api::HttpApi;
use focusboard::commands::*;
use focusboard::config::{load_config, log_dir};
use focusboard::logging;
use focusboard::store::BoardStore;
use focusboard::tui::run_tui;

#[derive(Parser)]
#[command(name = "focusboard")]
#[command(about = "Kanban productivity dashboard for the terminal", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Project id the task belongs to
        #[arg(short, long)]
        project: String,
        /// Estimated duration in minutes
        #[arg(short, long)]
        estimate: Option<u32>,
        /// Day in YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// low, medium or high
        #[arg(short = 'P', long)]
        priority: Option<String>,
        /// Starting column: planned or in_progress
        #[arg(short, long)]
        status: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List the tasks of a day
    List {
        /// Day in YYYY-MM-DD, `today`, `yesterday` or `tomorrow`
        #[arg(short, long)]
        date: Option<String>,
        /// List tasks of every day
        #[arg(short, long)]
        all: bool,
    },
    /// Edit a task
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New estimate in minutes
        #[arg(short, long)]
        estimate: Option<u32>,
        #[arg(short = 'P', long)]
        priority: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Move a task to another column
    Move {
        id: String,
        /// planned, in_progress or discarded
        status: String,
    },
    /// Complete a task and log its accomplishment
    Complete {
        id: String,
        /// Minutes it took (default: the estimate)
        #[arg(short, long)]
        time: Option<u32>,
        #[arg(short, long)]
        challenges: Option<String>,
        #[arg(short = 'm', long)]
        comments: Option<String>,
        /// Proof of work as KIND:TITLE[:URL], KIND is pr, screenshot or document
        #[arg(short, long)]
        attach: Vec<String>,
    },
    /// Delete a task
    Delete {
        id: String,
    },
    /// Show dashboard statistics
    Stats {
        #[arg(short, long)]
        date: Option<String>,
        /// Compute from the day's tasks instead of asking the server
        #[arg(short, long)]
        local: bool,
    },
    /// Show planned vs. completed tasks for the week
    Weekly {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show project highlights for a date range
    Summary {
        from: String,
        to: String,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage accomplishments
    Accomplishment {
        #[command(subcommand)]
        command: AccomplishmentCommands,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a new project
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List projects
    List,
}

#[derive(Subcommand)]
enum AccomplishmentCommands {
    /// Log an accomplishment
    Add {
        title: String,
        /// Task it belongs to
        #[arg(short, long)]
        task: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Minutes it took
        #[arg(long)]
        time: Option<u32>,
        #[arg(short, long)]
        challenges: Option<String>,
        #[arg(short = 'm', long)]
        comments: Option<String>,
        /// Proof of work as KIND:TITLE[:URL]
        #[arg(short, long)]
        attach: Vec<String>,
    },
    /// List accomplishments
    List {
        /// Only those of a task
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Edit an accomplishment
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        time: Option<u32>,
        #[arg(short, long)]
        challenges: Option<String>,
        #[arg(short = 'm', long)]
        comments: Option<String>,
    },
    /// Delete an accomplishment, or all of a task's
    Delete {
        id: Option<String>,
        #[arg(short, long, conflicts_with = "id")]
        task: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current settings
    Show,
    /// Set the API base URL
    SetUrl { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "focusboard", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Config { command }) => {
            match command {
                ConfigCommands::Show => cmd_config_show(),
                ConfigCommands::SetUrl { url } => cmd_config_set_url(url),
            }
            return Ok(());
        }
        other => other,
    };

    let config = load_config()?;
    let tui = matches!(command, Some(Commands::Ui) | None);
    // Held until exit so buffered log lines get flushed.
    let _log_guard = if tui {
        Some(logging::init_file(&log_dir(), cli.verbose)?)
    } else {
        logging::init_stderr(cli.verbose)?;
        None
    };

    let api = HttpApi::new(&config.api_base_url, config.request_timeout())
        .with_context(|| format!("cannot use API at {}", config.api_base_url))?;
    tracing::debug!(base_url = api.base_url(), "using board API");
    let mut store = BoardStore::new(Arc::new(api), Local::now().date_naive());
    let store = &mut store;

    match command {
        Some(Commands::Add { title, project, estimate, date, priority, status, description, notes }) => {
            cmd_add(store, title, project, estimate, date, priority, status, description, notes, config.default_estimate_minutes, false).await
        }
        Some(Commands::List { date, all }) => cmd_list(store, date, all).await,
        Some(Commands::Edit { id, title, description, estimate, priority, notes }) => {
            cmd_edit(store, id, title, description, estimate, priority, notes, false).await
        }
        Some(Commands::Move { id, status }) => cmd_move(store, id, status, false).await,
        Some(Commands::Complete { id, time, challenges, comments, attach }) => {
            cmd_complete(store, id, time, challenges, comments, attach, false).await
        }
        Some(Commands::Delete { id }) => cmd_delete(store, id, false).await,
        Some(Commands::Stats { date, local }) => cmd_stats(store, date, local).await,
        Some(Commands::Weekly { date }) => cmd_weekly(store, date).await,
        Some(Commands::Summary { from, to }) => cmd_summary(store, from, to).await,
        Some(Commands::Project { command }) => match command {
            ProjectCommands::Add { name, description } => cmd_project_add(store, name, description, false).await,
            ProjectCommands::List => cmd_project_list(store).await,
        },
        Some(Commands::Accomplishment { command }) => match command {
            AccomplishmentCommands::Add { title, task, description, time, challenges, comments, attach } => {
                cmd_accomplishment_add(store, title, task, description, time, challenges, comments, attach, false).await
            }
            AccomplishmentCommands::List { task } => cmd_accomplishment_list(store, task).await,
            AccomplishmentCommands::Edit { id, title, description, time, challenges, comments } => {
                cmd_accomplishment_edit(store, id, title, description, time, challenges, comments, false).await
            }
            AccomplishmentCommands::Delete { id, task } => cmd_accomplishment_delete(store, id, task, false).await,
        },
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(store, config.default_estimate_minutes).await {
                eprintln!("Error running TUI: {}", e);
            }
        }
        Some(Commands::Completions { .. }) | Some(Commands::Config { .. }) => {}
    }
    Ok(())
}
