mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use support::{task_due_in, TestEnv};
use trak::error::Result;
use trak::notify::{Notification, Notifier};
use trak::reminder::ReminderScheduler;
use trak::settings::{NotificationSettings, ReminderLead, SettingsPatch};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn sent_titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|notification| notification.title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn is_permission_granted(&self) -> Result<bool> {
        Ok(true)
    }

    fn request_permission(&self) -> Result<bool> {
        Ok(true)
    }

    fn send(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

async fn lead_of_30(env: &TestEnv) {
    env.settings
        .update(SettingsPatch {
            notifications: Some(NotificationSettings {
                time_notify: Some(ReminderLead::Minutes30),
                ..NotificationSettings::default()
            }),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn only_tasks_inside_the_window_fire_and_only_once() {
    let env = TestEnv::new().await;
    lead_of_30(&env).await;

    env.tasks.add(task_due_in(20, 1, "inside window")).await.unwrap();
    env.tasks.add(task_due_in(45, 2, "too far out")).await.unwrap();
    env.tasks.add(task_due_in(-5, 3, "already past")).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier.clone());

    for _ in 0..5 {
        scheduler.manual_check().await.unwrap();
    }

    let titles = notifier.sent_titles();
    assert_eq!(titles.len(), 1);
    assert!(titles[0].contains("inside window"));
}

#[tokio::test]
async fn completed_tasks_never_fire() {
    let env = TestEnv::new().await;
    lead_of_30(&env).await;

    let mut task = task_due_in(10, 1, "finished early");
    task.completed = true;
    env.tasks.add(task).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier.clone());
    scheduler.manual_check().await.unwrap();

    assert!(notifier.sent_titles().is_empty());
}

#[tokio::test]
async fn task_change_token_retriggers_a_reminder() {
    let env = TestEnv::new().await;
    lead_of_30(&env).await;
    env.tasks.add(task_due_in(20, 1, "still pending")).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let mut scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier.clone())
            .with_tick_interval(Duration::from_millis(20));

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(notifier.sent_titles().len(), 1);

    // Any task mutation clears the dedup set, so a pending deadline can
    // remind again after an edit.
    env.tasks.add(task_due_in(500, 2, "future work")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(notifier.sent_titles().len() >= 2);

    scheduler.stop();
}

#[tokio::test]
async fn manual_reset_also_retriggers() {
    let env = TestEnv::new().await;
    lead_of_30(&env).await;
    env.tasks.add(task_due_in(20, 1, "repeatable")).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier.clone());

    scheduler.manual_check().await.unwrap();
    scheduler.reset_notified().await;
    scheduler.manual_check().await.unwrap();

    assert_eq!(notifier.sent_titles().len(), 2);
}

#[tokio::test]
async fn disabled_deadline_alerts_suppress_everything() {
    let env = TestEnv::new().await;
    env.settings
        .update(SettingsPatch {
            notifications: Some(NotificationSettings {
                deadline: false,
                ..NotificationSettings::default()
            }),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    env.tasks.add(task_due_in(5, 1, "should stay quiet")).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier.clone());
    scheduler.manual_check().await.unwrap();

    assert!(notifier.sent_titles().is_empty());
}

#[tokio::test]
async fn stop_is_a_noop_when_idle() {
    let env = TestEnv::new().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut scheduler =
        ReminderScheduler::new(env.tasks.clone(), env.settings.clone(), notifier);

    assert!(!scheduler.is_running());
    scheduler.stop();
    assert!(!scheduler.is_running());

    scheduler.start();
    assert!(scheduler.is_running());
    scheduler.stop();
    assert!(!scheduler.is_running());
}
