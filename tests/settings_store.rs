mod support;

use support::TestEnv;
use trak::settings::{
    NotificationSettings, ReminderLead, SettingsPatch, SettingsRecord, ThemeSettings, Theme,
    SETTINGS_SCHEMA_VERSION,
};

#[tokio::test]
async fn fresh_install_gets_the_default_record() {
    let env = TestEnv::new().await;

    let record = env.settings.get().await.expect("settings seeded");
    assert_eq!(record, SettingsRecord::default());
    assert_eq!(record.schema_version, SETTINGS_SCHEMA_VERSION);
    assert!(record.notifications.deadline);
    assert_eq!(record.notifications.time_notify, Some(ReminderLead::Minutes30));
}

#[tokio::test]
async fn partial_update_replaces_whole_sections() {
    let env = TestEnv::new().await;

    // Tweak one leaf inside notifications first.
    let mut record = env.settings.get().await.unwrap();
    record.notifications.voice = true;
    env.settings.save(&record).await.unwrap();

    // Patching the section with defaults wipes that tweak: shallow merge
    // replaces the section, it does not merge leaves.
    env.settings
        .update(SettingsPatch {
            notifications: Some(NotificationSettings {
                time_notify: Some(ReminderLead::Hour),
                ..NotificationSettings::default()
            }),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();

    let merged = env.settings.get().await.unwrap();
    assert_eq!(merged.notifications.time_notify, Some(ReminderLead::Hour));
    assert!(!merged.notifications.voice);
    // Sections absent from the patch are untouched.
    assert_eq!(merged.user, SettingsRecord::default().user);
    assert_eq!(merged.theme, SettingsRecord::default().theme);
}

#[tokio::test]
async fn reset_returns_to_defaults() {
    let env = TestEnv::new().await;

    env.settings
        .update(SettingsPatch {
            theme: Some(ThemeSettings {
                value: Theme::Cyberpunk,
                ..ThemeSettings::default()
            }),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    env.settings.reset().await.unwrap();

    assert_eq!(env.settings.get().await.unwrap(), SettingsRecord::default());
}

#[tokio::test]
async fn settings_survive_a_reopen() {
    let mut env = TestEnv::new().await;

    env.settings
        .update(SettingsPatch {
            theme: Some(ThemeSettings {
                value: Theme::Emerald,
                ..ThemeSettings::default()
            }),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();

    env.reopen().await;

    let record = env.settings.get().await.unwrap();
    assert_eq!(record.theme.value, Theme::Emerald);

    // On-disk shape carries the version marker and the named theme.
    let raw = env.read_document("settings");
    assert_eq!(raw["settings"]["__version__"], SETTINGS_SCHEMA_VERSION);
    assert_eq!(raw["settings"]["theme"]["value"], "emerald");
}

#[tokio::test]
async fn legacy_record_is_migrated_on_init() {
    let mut env = TestEnv::new().await;

    // Simulate a v1 document written by an early release: short language
    // code, missing fields added later.
    std::fs::write(
        env.document_path("settings"),
        serde_json::to_vec_pretty(&serde_json::json!({
            "__version__": 1,
            "settings": {
                "__version__": 1,
                "user": { "username": "early adopter" },
                "theme": { "value": "dark", "language": "en" }
            }
        }))
        .unwrap(),
    )
    .unwrap();

    env.reopen().await;

    let record = env.settings.get().await.unwrap();
    assert_eq!(record.schema_version, SETTINGS_SCHEMA_VERSION);
    assert_eq!(record.user.username, "early adopter");
    // Defaults filled in field-by-field.
    assert_eq!(record.user.email, "user@example.com");
    assert!(record.notifications.deadline);

    let raw = env.read_document("settings");
    assert_eq!(raw["settings"]["theme"]["language"], "en-US");
}
