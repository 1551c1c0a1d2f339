//! Shared output formatting for trak CLI commands.

use serde::Serialize;

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "trak.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
            },
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    if !output.summary.is_empty() {
        lines.push(String::new());
        for (key, value) in &output.summary {
            if value.is_empty() {
                lines.push(format!("- {key}"));
            } else {
                lines.push(format!("- {key}: {value}"));
            }
        }
    }

    for item in &output.details {
        lines.push(item.clone());
    }

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;
    let mut subcommand = None;

    for arg in args.by_ref() {
        if arg.starts_with('-') {
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "trak".to_string(),
    };

    if matches!(command.as_str(), "task" | "focus" | "settings" | "remind") {
        for arg in args {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}
