use std::sync::Mutex;

/// Where user-facing cache notices go (the page's status area).
pub trait StatusSink: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Emits notices as tracing events under the `insight_cache::notice` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "insight_cache::notice", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "insight_cache::notice", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "insight_cache::notice", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Keeps every notice in memory; used by front ends that render notices
/// after the call returns, and by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(NoticeLevel, String)> {
        match self.notices.lock() {
            Ok(mut v) => std::mem::take(&mut *v),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        let mut guard = match self.notices.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, message.to_string()));
    }
}

impl StatusSink for RecordingSink {
    fn info(&self, message: &str) {
        self.push(NoticeLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.push(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }
}
