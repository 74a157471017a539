use std::time::{Duration, Instant};

const DEFAULT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    shown_at: Instant,
    duration: Duration,
}

impl Notification {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// Holds the single toast shown in the corner of the screen.
#[derive(Debug, Default)]
pub struct NotificationManager {
    current: Option<Notification>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.show_at(message, level, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, level: NotificationLevel, now: Instant) {
        self.current = Some(Notification {
            message: message.into(),
            level,
            shown_at: now,
            duration: DEFAULT_DURATION,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(message, NotificationLevel::Info);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(message, NotificationLevel::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, NotificationLevel::Error);
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Drops an expired notification. Returns true if one was removed.
    pub fn update(&mut self) -> bool {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_duration() {
        let now = Instant::now();
        let mut manager = NotificationManager::new();
        manager.show_at("Saved", NotificationLevel::Info, now);

        assert!(!manager.update_at(now + Duration::from_secs(1)));
        assert_eq!(manager.current().unwrap().message, "Saved");
        assert!(manager.update_at(now + DEFAULT_DURATION));
        assert!(manager.current().is_none());
    }
}
