//! Sent-command counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One atomic counter per command id a controller can send.
///
/// Incremented on the command path, read by monitoring. Counters are zeroed
/// at run start.
#[derive(Debug)]
pub struct CommandCounters {
    ids: &'static [&'static str],
    counts: Vec<AtomicU64>,
}

impl CommandCounters {
    /// Counters for the given command ids.
    pub fn new(ids: &'static [&'static str]) -> Self {
        let counts = ids.iter().map(|_| AtomicU64::new(0)).collect();
        Self { ids, counts }
    }

    /// Count one send of `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &str) {
        if let Some(position) = self.ids.iter().position(|known| *known == id) {
            self.counts[position].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current count for `id`.
    pub fn count(&self, id: &str) -> u64 {
        self.ids
            .iter()
            .position(|known| *known == id)
            .map(|position| self.counts[position].load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// All counters keyed by command id.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.ids
            .iter()
            .zip(&self.counts)
            .map(|(id, count)| (*id, count.load(Ordering::Relaxed)))
            .collect()
    }

    /// Zero all counters.
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}
