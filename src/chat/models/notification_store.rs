use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// One banner entry. Stays visible until dismissed or evicted.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub timestamp: SystemTime,
    pub level: NotificationLevel,
    pub message: String,
}

/// Process-wide dismissible notifications, shown as a top-level banner.
///
/// Bounded: once `max_entries` is exceeded the oldest entry is evicted.
pub struct NotificationStore {
    entries: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
    max_entries: usize,
}

impl NotificationStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            max_entries,
        }
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.lock();
        entries.push(Notification {
            id,
            timestamp: SystemTime::now(),
            level,
            message: message.into(),
        });
        if entries.len() > self.max_entries {
            entries.remove(0);
        }
        id
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Warning, message)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() < before
    }

    pub fn dismiss_all(&self) {
        self.entries.lock().clear();
    }

    /// Entries not yet dismissed, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == NotificationLevel::Error)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let store = NotificationStore::new(10);
        let id = store.error("send failed");
        assert_eq!(store.active().len(), 1);
        assert_eq!(store.active()[0].message, "send failed");

        assert!(store.dismiss(id));
        assert!(store.active().is_empty());
        assert!(!store.dismiss(id));
    }

    #[test]
    fn test_dismiss_all() {
        let store = NotificationStore::new(10);
        store.error("one");
        store.warning("two");
        store.dismiss_all();
        assert!(store.active().is_empty());
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let store = NotificationStore::new(2);
        store.error("first");
        store.error("second");
        store.error("third");

        let active = store.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "second");
        assert_eq!(active[1].message, "third");
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let store = NotificationStore::new(10);
        let a = store.error("a");
        let b = store.warning("b");
        assert!(b > a);
    }

    #[test]
    fn test_error_count_ignores_warnings() {
        let store = NotificationStore::new(10);
        store.error("a");
        store.warning("b");
        store.error("c");
        assert_eq!(store.error_count(), 2);
    }
}
