//! Command-line interface for trak
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::document::DocumentStore;
use crate::error::Result;
use crate::focus::{FocusStore, FOCUS_KEY};
use crate::output::OutputOptions;
use crate::settings::{SettingsStore, SETTINGS_KEY};
use crate::task::{TaskStore, TASKS_KEY};

pub mod focus;
pub mod init;
pub mod remind;
pub mod settings;
pub mod task;

/// trak - personal task and focus tracking
///
/// Tracks tasks, accumulates focus time per day, and reminds about
/// upcoming deadlines.
#[derive(Parser, Debug)]
#[command(name = "trak")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the trak documents (defaults to the platform
    /// data directory)
    #[arg(long, global = true, env = "TRAK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory and seed empty documents
    Init,

    /// Task management
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Focus-time ledger
    #[command(subcommand)]
    Focus(focus::FocusCommands),

    /// User settings
    #[command(subcommand)]
    Settings(settings::SettingsCommands),

    /// Deadline reminders
    #[command(subcommand)]
    Remind(remind::RemindCommands),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load_default();
        let data_dir = config.resolve_data_dir(self.data_dir.clone())?;
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(&config, &data_dir, options).await,
            Commands::Task(cmd) => task::run(cmd, &data_dir, options).await,
            Commands::Focus(cmd) => focus::run(cmd, &data_dir, options).await,
            Commands::Settings(cmd) => settings::run(cmd, &data_dir, options).await,
            Commands::Remind(cmd) => remind::run(cmd, &config, &data_dir, options).await,
        }
    }
}

/// The domain stores, wired over one document store and initialized.
pub struct Stores {
    pub tasks: TaskStore,
    pub focus: FocusStore,
    pub settings: SettingsStore,
}

/// Open and initialize every domain store. Initialization is awaited here
/// so commands never observe an un-seeded document.
pub async fn open_stores(data_dir: &Path) -> Result<Stores> {
    let docs = DocumentStore::new(data_dir);

    let tasks = TaskStore::new(docs.open(TASKS_KEY).await?);
    tasks.init().await?;

    let focus = FocusStore::new(docs.open(FOCUS_KEY).await?);
    focus.init().await?;

    let settings = SettingsStore::new(docs.open(SETTINGS_KEY).await?);
    settings.init().await?;

    Ok(Stores {
        tasks,
        focus,
        settings,
    })
}
