//! User-visible notification capability.
//!
//! The OS notification primitive is modeled as a trait with the
//! query/request/send contract: check whether permission is granted,
//! request it if not, and send only when granted. Every step is fallible;
//! a denied or absent backend degrades to a silent no-op for callers that
//! follow the contract.

use tracing::info;

use crate::error::Result;

/// One notification to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Permission-gated notification backend.
pub trait Notifier: Send + Sync {
    /// Whether display permission is currently granted.
    fn is_permission_granted(&self) -> Result<bool>;

    /// Ask the user for permission. Returns the resulting grant state.
    fn request_permission(&self) -> Result<bool>;

    /// Display one notification. Callers only invoke this when granted.
    fn send(&self, notification: &Notification) -> Result<()>;
}

/// Backend that writes notifications to the log. Permission is always
/// granted. Used by the CLI, where there is no display surface.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn is_permission_granted(&self) -> Result<bool> {
        Ok(true)
    }

    fn request_permission(&self) -> Result<bool> {
        Ok(true)
    }

    fn send(&self, notification: &Notification) -> Result<()> {
        info!(title = %notification.title, "{}", notification.body);
        println!("{}: {}", notification.title, notification.body);
        Ok(())
    }
}
