//! Deadline reminder scheduler.
//!
//! A recurring check over the task collection: any task that is not
//! completed, has a parseable deadline, and falls inside the configured
//! lead window gets exactly one reminder. Already-due tasks are skipped:
//! a reminder warns ahead of a deadline, it does not announce a missed
//! one.
//!
//! The scheduler is either Idle (no timer) or Running (a spawned loop
//! ticking at a fixed interval). `stop` cancels future ticks between tick
//! bodies and never interrupts one in flight. The de-duplication set is
//! process-lifetime state, cleared whenever a task-change token arrives on
//! the store's broadcast channel, so an edited or extended deadline can
//! fire again.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::settings::SettingsStore;
use crate::task::{TaskRecord, TaskStore};

/// Default wall-clock cadence of the deadline check.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Recurring deadline checker with at-most-once reminders per task.
pub struct ReminderScheduler {
    engine: Arc<Mutex<ReminderEngine>>,
    tasks: TaskStore,
    tick_interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ReminderScheduler {
    /// Build a scheduler over already-initialized stores. Idle until
    /// [`ReminderScheduler::start`].
    pub fn new(tasks: TaskStore, settings: SettingsStore, notifier: Arc<dyn Notifier>) -> Self {
        let engine = ReminderEngine {
            tasks: tasks.clone(),
            settings,
            notifier,
            notified: HashSet::new(),
        };
        Self {
            engine: Arc::new(Mutex::new(engine)),
            tasks,
            tick_interval: DEFAULT_TICK_INTERVAL,
            worker: None,
        }
    }

    /// Override the tick cadence. Only affects subsequent `start` calls.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Whether a check loop is currently armed.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| !worker.handle.is_finished())
            .unwrap_or(false)
    }

    /// Arm the recurring check. When already running, the existing timer
    /// is torn down and a fresh one armed.
    pub fn start(&mut self) {
        self.stop();

        let engine = Arc::clone(&self.engine);
        let mut changes = self.tasks.subscribe();
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            // First tick one full period out, like a plain repeating timer.
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let mut engine = engine.lock().await;
                        if let Err(err) = engine.check(Utc::now()).await {
                            warn!(error = %err, "deadline check failed, ending this cycle");
                        }
                    }
                    result = changes.recv() => {
                        match result {
                            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                                engine.lock().await.clear_notified();
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        info!(period_ms = period.as_millis() as u64, "deadline checks started");
        self.worker = Some(Worker { handle, shutdown });
    }

    /// Disarm the timer. Future ticks are cancelled; a tick already in
    /// flight finishes on its own. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(true);
            info!("deadline checks stopped");
        }
    }

    /// Run one evaluation pass immediately, outside the timer.
    pub async fn manual_check(&self) -> Result<()> {
        self.engine.lock().await.check(Utc::now()).await
    }

    /// Forget which tasks were already reminded.
    pub async fn reset_notified(&self) {
        self.engine.lock().await.clear_notified();
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ReminderEngine {
    tasks: TaskStore,
    settings: SettingsStore,
    notifier: Arc<dyn Notifier>,
    notified: HashSet<u64>,
}

impl ReminderEngine {
    /// One evaluation pass at instant `now`.
    async fn check(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(settings) = self.settings.get().await else {
            return Ok(());
        };
        if !settings.notifications.deadline {
            return Ok(());
        }
        let Some(lead) = settings.notifications.time_notify else {
            return Ok(());
        };

        for task in self.tasks.list().await {
            if task.completed || self.notified.contains(&task.id) {
                continue;
            }
            let Some(deadline) = task.deadline_instant() else {
                continue;
            };

            let minutes_remaining = (deadline - now).num_minutes();
            if minutes_remaining <= 0 {
                // Already due or past; not a reminder.
                continue;
            }
            if minutes_remaining <= lead.minutes() {
                self.dispatch(&task, minutes_remaining)?;
                self.notified.insert(task.id);
            }
        }
        Ok(())
    }

    /// Tri-step capability dance: check granted, request if not, send only
    /// when granted. Denial is a quiet no-op; the task still counts as
    /// reminded.
    fn dispatch(&self, task: &TaskRecord, minutes_left: i64) -> Result<()> {
        let mut granted = self.notifier.is_permission_granted()?;
        if !granted {
            granted = self.notifier.request_permission()?;
        }
        if !granted {
            debug!(task = task.id, "notification permission denied");
            return Ok(());
        }

        let remaining = format_remaining(minutes_left);
        let notification = Notification::new(
            format!("Task due soon: {}", task.title),
            format!("\"{}\" is due in {remaining}.", task.title),
        );
        self.notifier.send(&notification)?;
        debug!(task = task.id, %remaining, "reminder dispatched");
        Ok(())
    }

    fn clear_notified(&mut self) {
        self.notified.clear();
    }
}

/// Remaining time as hours + minutes, e.g. `1h 5m` or `20m`.
fn format_remaining(minutes: i64) -> String {
    if minutes >= 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest > 0 {
            format!("{hours}h {rest}m")
        } else {
            format!("{hours}h")
        }
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStore;
    use crate::settings::{NotificationSettings, SettingsPatch, SETTINGS_KEY};
    use crate::task::TASKS_KEY;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        granted: bool,
        sent: StdMutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn granting() -> Arc<Self> {
            Arc::new(Self {
                granted: true,
                sent: StdMutex::new(Vec::new()),
            })
        }

        fn denying() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn is_permission_granted(&self) -> Result<bool> {
            Ok(self.granted)
        }

        fn request_permission(&self) -> Result<bool> {
            Ok(self.granted)
        }

        fn send(&self, notification: &Notification) -> Result<()> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    async fn stores_in(temp: &TempDir) -> (TaskStore, SettingsStore) {
        let docs = DocumentStore::new(temp.path());
        let tasks = TaskStore::new(docs.open(TASKS_KEY).await.unwrap());
        tasks.init().await.unwrap();
        let settings = SettingsStore::new(docs.open(SETTINGS_KEY).await.unwrap());
        settings.init().await.unwrap();
        (tasks, settings)
    }

    fn due_in(minutes: i64, id: u64, title: &str) -> TaskRecord {
        let mut task = TaskRecord::new(id, title);
        task.deadline = Some((Utc::now() + chrono::Duration::minutes(minutes)).to_rfc3339());
        task
    }

    #[tokio::test]
    async fn reminds_once_inside_the_lead_window() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(20, 1, "ship release")).await.unwrap();
        tasks.add(due_in(45, 2, "outside window")).await.unwrap();
        tasks.add(due_in(-5, 3, "already late")).await.unwrap();

        let notifier = RecordingNotifier::granting();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());

        // Lead is 30 minutes by default: only the 20-minute task fires,
        // and only once across repeated passes.
        scheduler.manual_check().await.unwrap();
        scheduler.manual_check().await.unwrap();
        scheduler.manual_check().await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].title.contains("ship release"));
        assert!(sent[0].body.contains("is due in"));
    }

    #[tokio::test]
    async fn skips_completed_and_unparseable_deadlines() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;

        let mut done = due_in(10, 1, "done already");
        done.completed = true;
        tasks.add(done).await.unwrap();

        let mut garbled = TaskRecord::new(2, "bad date");
        garbled.deadline = Some("soonish".to_string());
        tasks.add(garbled).await.unwrap();

        let notifier = RecordingNotifier::granting();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());
        scheduler.manual_check().await.unwrap();

        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn disabled_alerts_skip_the_cycle() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(10, 1, "due soon")).await.unwrap();

        settings
            .update(SettingsPatch {
                notifications: Some(NotificationSettings {
                    deadline: false,
                    ..NotificationSettings::default()
                }),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        let notifier = RecordingNotifier::granting();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());
        scheduler.manual_check().await.unwrap();
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn null_lead_time_skips_the_cycle() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(10, 1, "due soon")).await.unwrap();

        settings
            .update(SettingsPatch {
                notifications: Some(NotificationSettings {
                    time_notify: None,
                    ..NotificationSettings::default()
                }),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        let notifier = RecordingNotifier::granting();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());
        scheduler.manual_check().await.unwrap();
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn denied_permission_still_marks_the_task() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(10, 1, "quiet")).await.unwrap();

        let notifier = RecordingNotifier::denying();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());
        scheduler.manual_check().await.unwrap();
        scheduler.manual_check().await.unwrap();

        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn reset_allows_a_second_reminder() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(15, 1, "twice")).await.unwrap();

        let notifier = RecordingNotifier::granting();
        let scheduler = ReminderScheduler::new(tasks, settings, notifier.clone());

        scheduler.manual_check().await.unwrap();
        scheduler.reset_notified().await;
        scheduler.manual_check().await.unwrap();

        assert_eq!(notifier.sent_count(), 2);
    }

    #[tokio::test]
    async fn running_loop_reminds_and_reclears_on_task_changes() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(20, 1, "watched")).await.unwrap();

        let notifier = RecordingNotifier::granting();
        let mut scheduler =
            ReminderScheduler::new(tasks.clone(), settings, notifier.clone())
                .with_tick_interval(Duration::from_millis(20));

        scheduler.start();
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(notifier.sent_count(), 1);

        // A mutation publishes a change token, clearing the dedup set, so
        // the still-pending task fires again on a later tick.
        tasks.add(due_in(200, 2, "unrelated")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(notifier.sent_count() >= 2);

        scheduler.stop();
        assert!(!scheduler.is_running());
        let after_stop = notifier.sent_count();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(notifier.sent_count(), after_stop);
    }

    #[tokio::test]
    async fn start_twice_rearms_without_duplicating_reminders() {
        let temp = TempDir::new().unwrap();
        let (tasks, settings) = stores_in(&temp).await;
        tasks.add(due_in(20, 1, "rearmed")).await.unwrap();

        let notifier = RecordingNotifier::granting();
        let mut scheduler = ReminderScheduler::new(tasks, settings, notifier.clone())
            .with_tick_interval(Duration::from_millis(20));

        scheduler.start();
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.stop();

        assert_eq!(notifier.sent_count(), 1);
    }

    #[test]
    fn remaining_time_formats_hours_and_minutes() {
        assert_eq!(format_remaining(20), "20m");
        assert_eq!(format_remaining(60), "1h");
        assert_eq!(format_remaining(65), "1h 5m");
        assert_eq!(format_remaining(1440), "24h");
    }
}
