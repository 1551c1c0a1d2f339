//! trak task command implementations.

use std::path::Path;

use chrono::DateTime;
use clap::Subcommand;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{Priority, TaskRecord};

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, default_value = "")]
        description: String,

        /// Priority: low, medium, high
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Deadline as an RFC 3339 instant, e.g. 2024-03-01T17:00:00Z
        #[arg(long)]
        deadline: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks
    List {
        /// Include hidden tasks
        #[arg(long)]
        all: bool,
    },

    /// Edit the task at a position
    Edit {
        /// Zero-based position in the list
        index: usize,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// New deadline; pass an empty string to remove it
        #[arg(long)]
        deadline: Option<String>,

        /// Hide from (or show in) the default listing
        #[arg(long)]
        hidden: Option<bool>,
    },

    /// Mark the task at a position completed
    Done {
        /// Zero-based position in the list
        index: usize,
    },

    /// Remove the task at a position
    Rm {
        /// Zero-based position in the list
        index: usize,
    },
}

#[derive(Serialize)]
struct TaskListData {
    count: usize,
    tasks: Vec<TaskRecord>,
}

pub async fn run(cmd: TaskCommands, data_dir: &Path, options: OutputOptions) -> Result<()> {
    let stores = super::open_stores(data_dir).await?;
    let tasks = stores.tasks;

    match cmd {
        TaskCommands::Add {
            title,
            description,
            priority,
            deadline,
            tags,
        } => {
            if let Some(raw) = deadline.as_deref() {
                validate_deadline(raw)?;
            }

            let existing = tasks.list().await;
            let id = existing.iter().map(|task| task.id).max().map_or(1, |max| max + 1);

            let mut task = TaskRecord::new(id, title);
            task.description = description;
            task.priority = parse_priority(&priority)?;
            task.deadline = deadline;
            task.tags = tags;
            let title = task.title.clone();
            tasks.add(task).await?;

            let mut human = HumanOutput::new(format!("Added task #{id}: {title}"));
            human.push_summary("position", (tasks.list().await.len() - 1).to_string());
            emit_success(options, "task add", &serde_json::json!({ "id": id }), Some(&human))
        }

        TaskCommands::List { all } => {
            let mut listed = tasks.list().await;
            if !all {
                listed.retain(|task| !task.hidden.unwrap_or(false));
            }

            let mut human = HumanOutput::new(format!("{} task(s)", listed.len()));
            for (index, task) in listed.iter().enumerate() {
                human.push_detail(format_task_line(index, task));
            }

            let data = TaskListData {
                count: listed.len(),
                tasks: listed,
            };
            emit_success(options, "task list", &data, Some(&human))
        }

        TaskCommands::Edit {
            index,
            title,
            description,
            priority,
            deadline,
            hidden,
        } => {
            let listed = tasks.list().await;
            let Some(current) = listed.get(index) else {
                return Err(Error::InvalidArgument(format!(
                    "no task at position {index}"
                )));
            };

            let mut updated = current.clone();
            if let Some(title) = title {
                updated.title = title;
            }
            if let Some(description) = description {
                updated.description = description;
            }
            if let Some(priority) = priority {
                updated.priority = parse_priority(&priority)?;
            }
            if let Some(deadline) = deadline {
                if deadline.is_empty() {
                    updated.deadline = None;
                } else {
                    validate_deadline(&deadline)?;
                    updated.deadline = Some(deadline);
                }
            }
            if let Some(hidden) = hidden {
                updated.hidden = hidden.then_some(true);
            }

            let title = updated.title.clone();
            tasks.update(index, updated).await?;
            let human = HumanOutput::new(format!("Updated task at {index}: {title}"));
            emit_success(
                options,
                "task edit",
                &serde_json::json!({ "index": index }),
                Some(&human),
            )
        }

        TaskCommands::Done { index } => {
            let listed = tasks.list().await;
            let Some(current) = listed.get(index) else {
                return Err(Error::InvalidArgument(format!(
                    "no task at position {index}"
                )));
            };

            let mut updated = current.clone();
            updated.completed = true;
            let title = updated.title.clone();
            tasks.update(index, updated).await?;

            let human = HumanOutput::new(format!("Completed: {title}"));
            emit_success(
                options,
                "task done",
                &serde_json::json!({ "index": index }),
                Some(&human),
            )
        }

        TaskCommands::Rm { index } => {
            let listed = tasks.list().await;
            let Some(current) = listed.get(index) else {
                return Err(Error::InvalidArgument(format!(
                    "no task at position {index}"
                )));
            };

            let title = current.title.clone();
            tasks.delete(index).await?;
            let human = HumanOutput::new(format!("Removed: {title}"));
            emit_success(
                options,
                "task rm",
                &serde_json::json!({ "index": index }),
                Some(&human),
            )
        }
    }
}

fn parse_priority(raw: &str) -> Result<Priority> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(Error::InvalidArgument(format!(
            "unknown priority '{other}' (expected low|medium|high)"
        ))),
    }
}

fn validate_deadline(raw: &str) -> Result<()> {
    DateTime::parse_from_rfc3339(raw).map_err(|err| {
        Error::InvalidArgument(format!("deadline '{raw}' is not an RFC 3339 instant: {err}"))
    })?;
    Ok(())
}

fn format_task_line(index: usize, task: &TaskRecord) -> String {
    let mark = if task.completed { "x" } else { " " };
    let priority = match task.priority {
        Priority::Low => "low",
        Priority::Medium => "med",
        Priority::High => "high",
    };
    let mut line = format!("[{mark}] {index}. ({priority}) {}", task.title);
    if let Some(deadline) = &task.deadline {
        line.push_str(&format!(" due {deadline}"));
    }
    if !task.tags.is_empty() {
        line.push_str(&format!(" [{}]", task.tags.join(", ")));
    }
    line
}
