//! trak init command implementation.

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Serialize)]
struct InitData {
    data_dir: String,
    documents: Vec<&'static str>,
    tick_secs: u64,
}

pub async fn run(config: &Config, data_dir: &Path, options: OutputOptions) -> Result<()> {
    super::open_stores(data_dir).await?;

    let data = InitData {
        data_dir: data_dir.display().to_string(),
        documents: vec!["tasks", "focus", "settings"],
        tick_secs: config.scheduler.tick_secs,
    };

    let mut human = HumanOutput::new("Initialized trak");
    human.push_summary("data dir", data.data_dir.clone());
    human.push_summary("documents", data.documents.join(", "));

    emit_success(options, "init", &data, Some(&human))
}
