// Per-container bounded history of derived metric records (in-memory only)

use std::collections::{HashMap, VecDeque};

use crate::models::ContainerMetrics;

/// Bounded FIFO of derived records per container.
///
/// Appends go at the tail; once a container's window exceeds `capacity`
/// the oldest entries are evicted from the head, so a window is always the
/// most recent `capacity` records in arrival order.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    windows: HashMap<String, VecDeque<ContainerMetrics>>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the retained window size. Existing windows are trimmed to
    /// the new bound immediately, oldest entries first.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        for window in self.windows.values_mut() {
            while window.len() > self.capacity {
                window.pop_front();
            }
        }
    }

    /// Append a record at the tail of its container's window.
    pub fn append(&mut self, record: ContainerMetrics) {
        let window = self.windows.entry(record.id.clone()).or_default();
        window.push_back(record);
        while window.len() > self.capacity {
            window.pop_front();
        }
    }

    /// Retained records for one container, oldest first. Returns a copy;
    /// the store keeps ownership of the live window.
    pub fn window(&self, id: &str) -> Vec<ContainerMetrics> {
        self.windows
            .get(id)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, timestamp_ms: u64) -> ContainerMetrics {
        ContainerMetrics {
            id: id.into(),
            name: id.into(),
            running: true,
            timestamp_ms,
            ..Default::default()
        }
    }

    #[test]
    fn append_keeps_most_recent_capacity_records_in_order() {
        let mut store = HistoryStore::new(3);
        for t in 1..=4 {
            store.append(record("c3", t));
        }
        let window = store.window("c3");
        assert_eq!(window.len(), 3);
        let times: Vec<u64> = window.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(times, vec![2, 3, 4]);
    }

    #[test]
    fn windows_are_independent_per_container() {
        let mut store = HistoryStore::new(2);
        store.append(record("a", 1));
        store.append(record("b", 1));
        store.append(record("a", 2));
        store.append(record("a", 3));
        assert_eq!(store.window("a").len(), 2);
        assert_eq!(store.window("b").len(), 1);
    }

    #[test]
    fn set_capacity_trims_immediately() {
        let mut store = HistoryStore::new(5);
        for t in 1..=5 {
            store.append(record("c1", t));
        }
        store.set_capacity(2);
        let times: Vec<u64> = store.window("c1").iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(times, vec![4, 5]);
    }

    #[test]
    fn unknown_container_has_empty_window() {
        let store = HistoryStore::new(3);
        assert!(store.window("nope").is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut store = HistoryStore::new(0);
        store.append(record("c1", 1));
        store.append(record("c1", 2));
        assert_eq!(store.window("c1").len(), 1);
        assert_eq!(store.capacity(), 1);
    }
}
