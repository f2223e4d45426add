//! Reader-facing side effects that are not markup: transient notifications,
//! the login dialog, and the stored auth token.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

pub trait Notifier: Send + Sync {
    /// Shows a transient, non-blocking message.
    fn notify(&self, message: &str, kind: NotificationKind);
    fn open_login_dialog(&self);
}

/// Notifier for headless use: every notification becomes a log line.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => info!(notification = message, "notify"),
            NotificationKind::Error => warn!(notification = message, "notify"),
        }
    }

    fn open_login_dialog(&self) {
        info!("login dialog requested");
    }
}

/// Read-only view of the persisted auth token.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

pub struct StaticToken(pub Option<String>);

impl TokenStore for StaticToken {
    fn token(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}
