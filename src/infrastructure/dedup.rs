//! In-flight request deduplication keyed by organization id
//!
//! Concurrent fetches for the same key share one execution; the entry is
//! dropped once it completes so the next fetch goes to the source again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::trace;

type Slot<T> = Arc<OnceLock<T>>;

#[derive(Debug)]
pub struct FetchDeduplicator<T> {
    in_flight: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> Default for FetchDeduplicator<T> {
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> FetchDeduplicator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<T>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `fetch` for `key`, or wait for and share the result of the one already running.
    pub fn run(&self, key: &str, fetch: impl FnOnce() -> T) -> T {
        let slot = {
            let mut in_flight = self.lock();
            Arc::clone(
                in_flight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(OnceLock::new())),
            )
        };

        let value = slot.get_or_init(|| {
            trace!(key, "fetch started");
            fetch()
        });
        let value = value.clone();

        let mut in_flight = self.lock();
        if in_flight.get(key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
            in_flight.remove(key);
        }
        value
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_sequential_fetches_run_each_time() {
        let dedup = FetchDeduplicator::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let value = dedup.run("org", || calls.fetch_add(1, Ordering::SeqCst));
            assert!(value < 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!dedup.is_in_flight("org"));
    }

    #[test]
    fn test_concurrent_fetches_share_one_call() {
        let dedup = Arc::new(FetchDeduplicator::<usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let first = {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            thread::spawn(move || {
                dedup.run("org", || {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    calls.fetch_add(1, Ordering::SeqCst) + 41
                })
            })
        };
        started_rx.recv().unwrap();
        assert!(dedup.is_in_flight("org"));

        let second = {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            thread::spawn(move || dedup.run("org", || calls.fetch_add(1, Ordering::SeqCst) + 100))
        };
        thread::sleep(Duration::from_millis(200));
        release_tx.send(()).unwrap();

        assert_eq!(first.join().unwrap(), 41);
        assert_eq!(second.join().unwrap(), 41);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let dedup = FetchDeduplicator::new();
        assert_eq!(dedup.run("a", || 1), 1);
        assert_eq!(dedup.run("b", || 2), 2);
    }
}
