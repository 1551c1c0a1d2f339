//! trak settings command implementations.

use std::path::Path;

use clap::Subcommand;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::settings::{Language, ReminderLead, SettingsPatch, SettingsRecord, Theme};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the current settings
    Show,

    /// Change settings fields
    Set {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Avatar reference; pass an empty string to remove it
        #[arg(long)]
        avatar: Option<String>,

        /// Theme: light, dark, cupcake, bumblebee, emerald, corporate,
        /// synthwave, retro, cyberpunk
        #[arg(long)]
        theme: Option<String>,

        /// Language: zh-CN or en-US
        #[arg(long)]
        language: Option<String>,

        /// Task reminders on/off
        #[arg(long)]
        task_reminders: Option<bool>,

        /// Deadline alerts on/off
        #[arg(long)]
        deadline_alerts: Option<bool>,

        /// Daily outline on/off
        #[arg(long)]
        daily_outline: Option<bool>,

        /// Audible notifications on/off
        #[arg(long)]
        voice: Option<bool>,

        /// Reminder lead time in minutes: 5, 10, 15, 30, 60, 120 or 1440;
        /// 0 disables lead-based reminders
        #[arg(long)]
        lead: Option<u32>,
    },

    /// Restore the default settings
    Reset,
}

pub async fn run(cmd: SettingsCommands, data_dir: &Path, options: OutputOptions) -> Result<()> {
    let stores = super::open_stores(data_dir).await?;
    let settings = stores.settings;

    match cmd {
        SettingsCommands::Show => {
            let record = settings.get().await.unwrap_or_default();
            emit_success(options, "settings show", &record, Some(&describe(&record)))
        }

        SettingsCommands::Set {
            username,
            email,
            avatar,
            theme,
            language,
            task_reminders,
            deadline_alerts,
            daily_outline,
            voice,
            lead,
        } => {
            // The store merge is shallow per section, so each touched
            // section is rebuilt from the current record before patching.
            let current = settings.get().await.unwrap_or_default();
            let mut patch = SettingsPatch::default();

            if username.is_some() || email.is_some() || avatar.is_some() {
                let mut user = current.user.clone();
                if let Some(username) = username {
                    user.username = username;
                }
                if let Some(email) = email {
                    user.email = email;
                }
                if let Some(avatar) = avatar {
                    user.avatar = if avatar.is_empty() { None } else { Some(avatar) };
                }
                patch.user = Some(user);
            }

            if task_reminders.is_some()
                || deadline_alerts.is_some()
                || daily_outline.is_some()
                || voice.is_some()
                || lead.is_some()
            {
                let mut notifications = current.notifications.clone();
                if let Some(task) = task_reminders {
                    notifications.task = task;
                }
                if let Some(deadline) = deadline_alerts {
                    notifications.deadline = deadline;
                }
                if let Some(daily_outline) = daily_outline {
                    notifications.daily_outline = daily_outline;
                }
                if let Some(voice) = voice {
                    notifications.voice = voice;
                }
                if let Some(lead) = lead {
                    notifications.time_notify = if lead == 0 {
                        None
                    } else {
                        Some(ReminderLead::try_from(lead).map_err(Error::InvalidArgument)?)
                    };
                }
                patch.notifications = Some(notifications);
            }

            if theme.is_some() || language.is_some() {
                let mut section = current.theme.clone();
                if let Some(theme) = theme {
                    section.value = parse_theme(&theme)?;
                }
                if let Some(language) = language {
                    section.language = parse_language(&language)?;
                }
                patch.theme = Some(section);
            }

            settings.update(patch).await?;
            let record = settings.get().await.unwrap_or_default();
            emit_success(options, "settings set", &record, Some(&describe(&record)))
        }

        SettingsCommands::Reset => {
            settings.reset().await?;
            let record = settings.get().await.unwrap_or_default();
            emit_success(options, "settings reset", &record, Some(&describe(&record)))
        }
    }
}

fn describe(record: &SettingsRecord) -> HumanOutput {
    let mut human = HumanOutput::new(format!("Settings for {}", record.user.username));
    human.push_summary("email", record.user.email.clone());
    human.push_summary(
        "deadline alerts",
        if record.notifications.deadline { "on" } else { "off" },
    );
    human.push_summary(
        "lead time",
        record
            .notifications
            .time_notify
            .map(|lead| format!("{}m", lead.minutes()))
            .unwrap_or_else(|| "off".to_string()),
    );
    human.push_summary("theme", format!("{:?}", record.theme.value).to_lowercase());
    human.push_summary(
        "language",
        match record.theme.language {
            Language::ZhCn => "zh-CN",
            Language::EnUs => "en-US",
        },
    );
    human
}

fn parse_theme(raw: &str) -> Result<Theme> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "cupcake" => Ok(Theme::Cupcake),
        "bumblebee" => Ok(Theme::Bumblebee),
        "emerald" => Ok(Theme::Emerald),
        "corporate" => Ok(Theme::Corporate),
        "synthwave" => Ok(Theme::Synthwave),
        "retro" => Ok(Theme::Retro),
        "cyberpunk" => Ok(Theme::Cyberpunk),
        other => Err(Error::InvalidArgument(format!("unknown theme '{other}'"))),
    }
}

fn parse_language(raw: &str) -> Result<Language> {
    match raw.trim() {
        "zh-CN" | "zh" => Ok(Language::ZhCn),
        "en-US" | "en" => Ok(Language::EnUs),
        other => Err(Error::InvalidArgument(format!(
            "unknown language '{other}' (expected zh-CN or en-US)"
        ))),
    }
}
