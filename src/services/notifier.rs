use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// User-facing feedback produced by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Sending half of the feedback channel. Cloned into whichever layer reports to users.
#[derive(Clone)]
pub struct Notifier {
    tx: UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Success, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Error, message.into());
    }

    fn send(&self, level: NotificationLevel, message: String) {
        if self.tx.send(Notification { level, message }).is_err() {
            debug!("notification dropped: receiver closed");
        }
    }
}

/// Drains the channel into the log until every sender is gone.
pub async fn forward_to_log(mut rx: UnboundedReceiver<Notification>) {
    info!("Starting notification forwarder");
    while let Some(n) = rx.recv().await {
        match n.level {
            NotificationLevel::Success => info!(target: "notifications", "{}", n.message),
            NotificationLevel::Warning => warn!(target: "notifications", "{}", n.message),
            NotificationLevel::Error => error!(target: "notifications", "{}", n.message),
        }
    }
    info!("Notification forwarder stopped");
}
