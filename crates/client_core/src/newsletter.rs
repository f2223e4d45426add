use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::{
    error::ClientError,
    notify::{NotificationKind, Notifier},
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_PATTERN: invalid regex pattern")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsletterOutcome {
    Subscribed(String),
    Rejected,
}

/// Signup form. Nothing is sent anywhere; a valid address is acknowledged.
pub struct NewsletterForm<'a> {
    notifier: &'a dyn Notifier,
}

impl<'a> NewsletterForm<'a> {
    pub fn new(notifier: &'a dyn Notifier) -> Self {
        Self { notifier }
    }

    pub fn submit(&self, email: &str) -> NewsletterOutcome {
        let email = email.trim();
        if !validate_email(email) {
            let err = ClientError::EmptyInput("Enter a valid email address".to_string());
            warn!("newsletter: signup rejected: {err}");
            self.notifier
                .notify(&err.to_string(), NotificationKind::Error);
            return NewsletterOutcome::Rejected;
        }

        info!("newsletter: subscribed");
        self.notifier.notify(
            &format!("Thank you for subscribing! A confirmation was sent to {email}"),
            NotificationKind::Success,
        );
        NewsletterOutcome::Subscribed(email.to_string())
    }
}

#[cfg(test)]
#[path = "tests/newsletter_tests.rs"]
mod tests;
