//! trak focus command implementations.

use std::path::Path;

use chrono::Local;
use clap::Subcommand;
use serde::Serialize;

use crate::error::Result;
use crate::focus::FocusLedger;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Subcommand, Debug)]
pub enum FocusCommands {
    /// Record focus minutes for a day
    Add {
        /// Minutes to add
        minutes: u64,

        /// Day to credit, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Show the ledger, optionally restricted to a day range
    Show {
        /// First day of the range, YYYY-MM-DD
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Last day of the range, YYYY-MM-DD
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Total minutes across the whole ledger
    Total,

    /// Delete every ledger entry
    Clear,
}

#[derive(Serialize)]
struct LedgerData {
    days: usize,
    total_minutes: u64,
    entries: FocusLedger,
}

pub async fn run(cmd: FocusCommands, data_dir: &Path, options: OutputOptions) -> Result<()> {
    let stores = super::open_stores(data_dir).await?;
    let focus = stores.focus;

    match cmd {
        FocusCommands::Add { minutes, day } => {
            let day = day.unwrap_or_else(today);
            focus.add_minutes(&day, minutes).await?;
            let total = focus.get_minutes(&day).await;

            let mut human = HumanOutput::new(format!("Recorded {minutes}m of focus"));
            human.push_summary("day", day.clone());
            human.push_summary("day total", format!("{total}m"));
            emit_success(
                options,
                "focus add",
                &serde_json::json!({ "day": day, "minutes": total }),
                Some(&human),
            )
        }

        FocusCommands::Show { from, to } => {
            let entries = match (from, to) {
                (Some(from), Some(to)) => focus.get_range(&from, &to).await,
                _ => focus.get_all().await,
            };

            let total_minutes = entries.values().sum();
            let mut human = HumanOutput::new(format!("{} day(s) of focus", entries.len()));
            for (day, minutes) in &entries {
                human.push_detail(format!("{day}: {minutes}m"));
            }

            let data = LedgerData {
                days: entries.len(),
                total_minutes,
                entries,
            };
            emit_success(options, "focus show", &data, Some(&human))
        }

        FocusCommands::Total => {
            let total = focus.total_minutes().await;
            let human = HumanOutput::new(format!("{total}m of focus recorded"));
            emit_success(
                options,
                "focus total",
                &serde_json::json!({ "total_minutes": total }),
                Some(&human),
            )
        }

        FocusCommands::Clear => {
            focus.clear().await?;
            let human = HumanOutput::new("Cleared the focus ledger");
            emit_success(
                options,
                "focus clear",
                &serde_json::json!({ "cleared": true }),
                Some(&human),
            )
        }
    }
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
