//! trak remind command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;

use crate::config::Config;
use crate::error::Result;
use crate::notify::LogNotifier;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::reminder::ReminderScheduler;

#[derive(Subcommand, Debug)]
pub enum RemindCommands {
    /// Run one deadline check immediately
    Check,

    /// Keep checking deadlines until interrupted
    Watch,
}

pub async fn run(
    cmd: RemindCommands,
    config: &Config,
    data_dir: &Path,
    options: OutputOptions,
) -> Result<()> {
    let stores = super::open_stores(data_dir).await?;
    let scheduler = ReminderScheduler::new(
        stores.tasks,
        stores.settings,
        Arc::new(LogNotifier),
    )
    .with_tick_interval(Duration::from_secs(config.scheduler.tick_secs));

    match cmd {
        RemindCommands::Check => {
            scheduler.manual_check().await?;
            let human = HumanOutput::new("Deadline check complete");
            emit_success(
                options,
                "remind check",
                &serde_json::json!({ "checked": true }),
                Some(&human),
            )
        }

        RemindCommands::Watch => {
            let mut scheduler = scheduler;
            scheduler.start();
            if !options.quiet && !options.json {
                println!(
                    "Watching deadlines every {}s, Ctrl-C to stop",
                    config.scheduler.tick_secs
                );
            }

            tokio::signal::ctrl_c().await?;
            scheduler.stop();

            let human = HumanOutput::new("Stopped watching deadlines");
            emit_success(
                options,
                "remind watch",
                &serde_json::json!({ "stopped": true }),
                Some(&human),
            )
        }
    }
}
