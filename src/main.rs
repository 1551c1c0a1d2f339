//! trak - Personal task and focus tracking CLI
//!
//! A standalone CLI over the trak stores: tasks, focus time, settings,
//! and deadline reminders.

use clap::Parser;
use trak::cli::Cli;
use trak::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Tracing is opt-in via RUST_LOG.
    // Keep startup robust in scripted envs: ignore invalid/huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run().await {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
