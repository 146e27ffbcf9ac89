//! User-facing notices ("toasts") raised by a tool controller.
//!
//! The controller never prints or logs on its own behalf; it hands every
//! user-visible message to an injected [`Notifier`]. A GUI would show a toast,
//! the CLI prints a coloured line, and tests record the notices to assert on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Discards every notice.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Forwards notices to `tracing` at the matching level.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!(notice = %notice.message),
            NoticeLevel::Warning => warn!(notice = %notice.message),
            NoticeLevel::Error => error!(notice = %notice.message),
        }
    }
}

/// Keeps every notice in memory, in arrival order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Notices of one level only.
    pub fn of_level(&self, level: NoticeLevel) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .collect()
    }

    pub fn clear(&self) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn recording_keeps_order_and_levels() {
        let rec = RecordingNotifier::new();
        rec.notify(Notice::warning("first"));
        rec.notify(Notice::error("second"));
        rec.notify(Notice::success("third"));

        let all = rec.notices();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "first");
        assert_eq!(rec.of_level(NoticeLevel::Error), vec![Notice::error("second")]);

        rec.clear();
        assert!(rec.notices().is_empty());
    }

    #[test]
    fn notifiers_are_object_safe() {
        let sinks: Vec<Arc<dyn Notifier>> = vec![
            Arc::new(NoopNotifier),
            Arc::new(TracingNotifier),
            Arc::new(RecordingNotifier::new()),
        ];
        for sink in sinks {
            sink.notify(Notice::info("hello"));
        }
    }

    #[test]
    fn notice_serialises_with_lowercase_level() {
        let json = serde_json::to_string(&Notice::warning("careful")).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"careful"}"#);
    }
}
