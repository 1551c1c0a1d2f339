//! User settings.
//!
//! A single always-present record in the `settings` document: profile,
//! notification toggles, and interface preferences. Loading is tolerant of
//! older shapes; every field falls back to its default individually, and
//! legacy short language codes ("zh", "en") are accepted and normalized on
//! the next save.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentHandle, VERSION_FIELD};
use crate::error::Result;

/// Storage key of the backing document.
pub const SETTINGS_KEY: &str = "settings";

/// Field holding the settings record.
const SETTINGS_FIELD: &str = "settings";

/// Current schema version of the settings record.
pub const SETTINGS_SCHEMA_VERSION: u64 = 2;

/// Interface theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Cupcake,
    Bumblebee,
    Emerald,
    Corporate,
    Synthwave,
    Retro,
    Cyberpunk,
}

/// Interface language. Accepts the legacy short codes from early releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-CN", alias = "zh")]
    ZhCn,
    #[default]
    #[serde(rename = "en-US", alias = "en")]
    EnUs,
}

/// Minutes of lead time before a deadline at which a reminder fires.
/// Only these values are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum ReminderLead {
    Minutes5,
    Minutes10,
    Minutes15,
    Minutes30,
    Hour,
    TwoHours,
    Day,
}

impl ReminderLead {
    pub fn minutes(self) -> i64 {
        u32::from(self) as i64
    }
}

impl From<ReminderLead> for u32 {
    fn from(lead: ReminderLead) -> Self {
        match lead {
            ReminderLead::Minutes5 => 5,
            ReminderLead::Minutes10 => 10,
            ReminderLead::Minutes15 => 15,
            ReminderLead::Minutes30 => 30,
            ReminderLead::Hour => 60,
            ReminderLead::TwoHours => 120,
            ReminderLead::Day => 1440,
        }
    }
}

impl TryFrom<u32> for ReminderLead {
    type Error = String;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            5 => Ok(ReminderLead::Minutes5),
            10 => Ok(ReminderLead::Minutes10),
            15 => Ok(ReminderLead::Minutes15),
            30 => Ok(ReminderLead::Minutes30),
            60 => Ok(ReminderLead::Hour),
            120 => Ok(ReminderLead::TwoHours),
            1440 => Ok(ReminderLead::Day),
            other => Err(format!(
                "lead time must be one of 5/10/15/30/60/120/1440 minutes, got {other}"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

fn default_username() -> String {
    "user".to_string()
}

fn default_email() -> String {
    "user@example.com".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            email: default_email(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Task reminders on/off.
    #[serde(default = "default_true")]
    pub task: bool,
    /// Deadline alerts on/off; gates the reminder scheduler entirely.
    #[serde(default = "default_true")]
    pub deadline: bool,
    /// Morning outline of the day's tasks.
    #[serde(default = "default_true")]
    pub daily_outline: bool,
    /// Audible notifications.
    #[serde(default)]
    pub voice: bool,
    /// Lead time for deadline reminders. An explicit null disables
    /// lead-based reminders; a missing field gets the default.
    #[serde(default = "default_lead")]
    pub time_notify: Option<ReminderLead>,
}

fn default_true() -> bool {
    true
}

fn default_lead() -> Option<ReminderLead> {
    Some(ReminderLead::Minutes30)
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            task: true,
            deadline: true,
            daily_outline: true,
            voice: false,
            time_notify: default_lead(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default)]
    pub value: Theme,
    #[serde(default)]
    pub language: Language,
}

/// The one settings record per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(rename = "__version__", default)]
    pub schema_version: u64,
    #[serde(default)]
    pub user: UserSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            user: UserSettings::default(),
            notifications: NotificationSettings::default(),
            theme: ThemeSettings::default(),
        }
    }
}

/// Partial update: each present section replaces that whole section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeSettings>,
}

/// Single-record settings persistence.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    doc: DocumentHandle,
}

impl SettingsStore {
    /// Wrap an opened `settings` document. Call [`SettingsStore::init`]
    /// before any other operation.
    pub fn new(doc: DocumentHandle) -> Self {
        Self { doc }
    }

    /// Seed the compiled-in defaults when no record exists; re-save an
    /// older-shape record once so legacy fields are normalized on disk.
    /// Idempotent.
    pub async fn init(&self) -> Result<()> {
        match self.get().await {
            None => self.save(&SettingsRecord::default()).await,
            Some(record) if record.schema_version < SETTINGS_SCHEMA_VERSION => {
                let mut migrated = record;
                migrated.schema_version = SETTINGS_SCHEMA_VERSION;
                self.save(&migrated).await
            }
            Some(_) => Ok(()),
        }
    }

    /// The current record, `None` when absent or unreadable.
    pub async fn get(&self) -> Option<SettingsRecord> {
        self.doc.get_as(SETTINGS_FIELD).await
    }

    /// Full overwrite.
    pub async fn save(&self, record: &SettingsRecord) -> Result<()> {
        self.doc.set_as(SETTINGS_FIELD, record).await?;
        self.doc.set(VERSION_FIELD, record.schema_version.into()).await;
        self.doc.persist().await
    }

    /// Shallow-merge `patch` onto the current record (or the defaults when
    /// none exists) and save the result.
    ///
    /// The merge is shallow at section granularity: a patch carrying a
    /// `notifications` section replaces every field of that section, it
    /// does not merge leaf-by-leaf.
    pub async fn update(&self, patch: SettingsPatch) -> Result<()> {
        let mut record = self.get().await.unwrap_or_default();
        if let Some(user) = patch.user {
            record.user = user;
        }
        if let Some(notifications) = patch.notifications {
            record.notifications = notifications;
        }
        if let Some(theme) = patch.theme {
            record.theme = theme;
        }
        self.save(&record).await
    }

    /// Overwrite with the compiled-in defaults.
    pub async fn reset(&self) -> Result<()> {
        self.save(&SettingsRecord::default()).await
    }
}
