//! Desktop notification adapter using notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

const APP_NAME: &str = "Interview Capture";

/// How long a notification stays on screen, by severity
fn display_time(icon: NotificationIcon) -> Timeout {
    match icon {
        NotificationIcon::Error | NotificationIcon::Camera => Timeout::Milliseconds(10_000),
        NotificationIcon::Warning => Timeout::Milliseconds(7_000),
        NotificationIcon::Info | NotificationIcon::Success => Timeout::Milliseconds(4_000),
    }
}

/// Desktop notifier for interview milestones (device errors, finish, abandon)
pub struct NotifyRustNotifier {
    app_name: String,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
        }
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(title)
            .body(message)
            .icon(icon.icon_name())
            .timeout(display_time(icon));

        // show() blocks on D-Bus
        tokio::task::spawn_blocking(move || notification.show().map(|_| ()))
            .await
            .map_err(|e| NotificationError::SendFailed(format!("notification task failed: {}", e)))?
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}
