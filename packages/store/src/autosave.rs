//! # Autosave policy: when a dirty editor writes its draft
//!
//! A dirty editor saves its draft when either:
//!
//! - `debounce` has passed since the **last** edit (the user paused), or
//! - `max_interval` has passed since the **first** unsaved edit (the user keeps
//!   typing without pause).
//!
//! So a draft is always persisted within `max_interval` of becoming dirty and
//! within `debounce` of going idle. [`AutosaveTracker`] holds no timers; callers
//! pass `now` in and poll [`AutosaveTracker::due`] from whatever tick they have.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_DEBOUNCE_MS: i64 = 1_000;
pub const DEFAULT_MAX_INTERVAL_MS: i64 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutosavePolicy {
    pub debounce: Duration,
    pub max_interval: Duration,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            debounce: Duration::milliseconds(DEFAULT_DEBOUNCE_MS),
            max_interval: Duration::milliseconds(DEFAULT_MAX_INTERVAL_MS),
        }
    }
}

impl AutosavePolicy {
    pub fn new(debounce: Duration, max_interval: Duration) -> Self {
        Self {
            debounce,
            max_interval,
        }
    }
}

/// Tracks unsaved edits against an [`AutosavePolicy`].
#[derive(Clone, Debug, Default)]
pub struct AutosaveTracker {
    policy: AutosavePolicy,
    first_unsaved: Option<DateTime<Utc>>,
    last_edit: Option<DateTime<Utc>>,
}

impl AutosaveTracker {
    pub fn new(policy: AutosavePolicy) -> Self {
        Self {
            policy,
            first_unsaved: None,
            last_edit: None,
        }
    }

    pub fn policy(&self) -> AutosavePolicy {
        self.policy
    }

    /// Record an edit that left the editor dirty.
    pub fn on_edit(&mut self, now: DateTime<Utc>) {
        self.first_unsaved.get_or_insert(now);
        self.last_edit = Some(now);
    }

    /// Forget pending edits, e.g. when the user reverted to the saved state.
    pub fn reset(&mut self) {
        self.first_unsaved = None;
        self.last_edit = None;
    }

    /// Call after the draft was written.
    pub fn mark_saved(&mut self) {
        self.reset();
    }

    pub fn is_dirty(&self) -> bool {
        self.first_unsaved.is_some()
    }

    pub fn due(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// The moment the pending edits must be saved by, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let first = self.first_unsaved?;
        let last = self.last_edit.unwrap_or(first);
        Some((last + self.policy.debounce).min(first + self.policy.max_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_clean_editor_never_due() {
        let tracker = AutosaveTracker::default();
        assert!(!tracker.is_dirty());
        assert!(!tracker.due(t(60_000)));
        assert!(tracker.deadline().is_none());
    }

    #[test]
    fn test_saves_after_debounce() {
        let mut tracker = AutosaveTracker::default();
        tracker.on_edit(t(0));
        assert!(!tracker.due(t(999)));
        assert!(tracker.due(t(1_000)));

        tracker.mark_saved();
        assert!(!tracker.due(t(10_000)));
    }

    #[test]
    fn test_continuous_typing_hits_max_interval() {
        let mut tracker = AutosaveTracker::default();
        // An edit every 500ms never lets the debounce elapse.
        for i in 0..10 {
            tracker.on_edit(t(i * 500));
            if i * 500 < DEFAULT_MAX_INTERVAL_MS {
                assert!(!tracker.due(t(i * 500)));
            }
        }
        assert!(tracker.due(t(DEFAULT_MAX_INTERVAL_MS)));
    }

    #[test]
    fn test_idle_editor_saved_within_window() {
        // Title typed once, then the editor sits idle for six seconds.
        let mut tracker = AutosaveTracker::default();
        tracker.on_edit(t(0));
        let deadline = tracker.deadline().unwrap();
        assert!(deadline <= t(6_000));
        assert!(tracker.due(t(6_000)));
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut tracker = AutosaveTracker::new(AutosavePolicy::new(
            Duration::milliseconds(100),
            Duration::milliseconds(200),
        ));
        tracker.on_edit(t(0));
        tracker.reset();
        assert!(!tracker.is_dirty());
        assert!(!tracker.due(t(1_000)));
    }
}
