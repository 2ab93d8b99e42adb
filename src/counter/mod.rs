use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory download counts keyed by file name.
///
/// Counts start empty at process start and are lost on restart. A single
/// lock guards the whole table, so concurrent increments never lose updates.
#[derive(Debug, Default)]
pub struct DownloadCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl DownloadCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one download attempt for `name`, returning the new total
    pub fn increment(&self, name: &str) -> u64 {
        let mut counts = self.lock();
        let count = counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count for `name`, 0 if it was never downloaded
    pub fn get(&self, name: &str) -> u64 {
        self.lock().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
