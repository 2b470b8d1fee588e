use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Bounded map of source message id → forwarded message id.
///
/// A record exists iff the source message was successfully forwarded; absence
/// means "not forwarded". Records are never mutated after insertion. Once
/// `capacity` is reached the oldest forward is evicted first, so a
/// long-running process holds a fixed amount of state; an edit to an evicted
/// message degrades to the same no-op as an edit arriving after a restart.
///
/// All operations are synchronous and non-suspending, so the lock is never
/// held across an await point.
pub struct ForwardStore {
    capacity: usize,
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    records: HashMap<u64, u64>,
    order: VecDeque<u64>,
}

impl ForwardStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(StoreInner {
                records: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Insert the record for a successful forward. Re-recording an id (which
    /// should not happen in practice) replaces the forwarded id in place.
    pub fn record(&self, source_id: u64, forwarded_id: u64) {
        let mut inner = self.lock();
        if inner.records.insert(source_id, forwarded_id).is_none() {
            inner.order.push_back(source_id);
        }
        while inner.records.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.records.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn lookup(&self, source_id: u64) -> Option<u64> {
        self.lock().records.get(&source_id).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_lookup_round_trips() {
        let store = ForwardStore::new(16);
        store.record(1, 101);
        assert_eq!(store.lookup(1), Some(101));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lookup_of_unknown_id_is_none() {
        let store = ForwardStore::new(16);
        assert_eq!(store.lookup(42), None);
        assert!(store.is_empty());
    }

    #[test]
    fn oldest_record_is_evicted_first() {
        let store = ForwardStore::new(2);
        store.record(1, 101);
        store.record(2, 102);
        store.record(3, 103);
        assert_eq!(store.lookup(1), None);
        assert_eq!(store.lookup(2), Some(102));
        assert_eq!(store.lookup(3), Some(103));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn re_recording_replaces_in_place_without_growth() {
        let store = ForwardStore::new(2);
        store.record(1, 101);
        store.record(1, 111);
        assert_eq!(store.lookup(1), Some(111));
        assert_eq!(store.len(), 1);

        // The replaced record still occupies a single eviction slot.
        store.record(2, 102);
        store.record(3, 103);
        assert_eq!(store.lookup(1), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn zero_capacity_still_tracks_the_latest_forward() {
        let store = ForwardStore::new(0);
        store.record(1, 101);
        assert_eq!(store.lookup(1), Some(101));
        store.record(2, 102);
        assert_eq!(store.lookup(1), None);
        assert_eq!(store.lookup(2), Some(102));
    }
}
