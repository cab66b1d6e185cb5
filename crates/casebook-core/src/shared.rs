//! Thread-shareable handle over one `CaseStore`.
//!
//! The record map and its three derived structures are guarded as a single
//! unit by one `RwLock`. Writers hold the exclusive lock for the whole
//! mutation, including the priority rebuild, so a reader never observes one
//! structure updated and another stale.

use std::sync::{Arc, PoisonError, RwLock};

use crate::store::CaseStore;

#[derive(Debug, Clone, Default)]
pub struct SharedCaseStore {
    inner: Arc<RwLock<CaseStore>>,
}

impl SharedCaseStore {
    pub fn new(store: CaseStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run `f` under the exclusive lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut CaseStore) -> T) -> T {
        // Store operations check preconditions before touching state, so a
        // poisoned lock still guards a consistent store.
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Run `f` under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&CaseStore) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl From<CaseStore> for SharedCaseStore {
    fn from(store: CaseStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_writers_and_readers_see_consistent_state() {
        let shared = SharedCaseStore::default();

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for n in 0..50 {
                        let id = worker * 1000 + n;
                        shared
                            .write(|store| store.add(id, format!("case {id}"), n % 5))
                            .expect("distinct ids never collide");
                        if n % 3 == 0 {
                            shared
                                .write(|store| store.delete(id))
                                .expect("case was just added");
                        }
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(shared.read(CaseStore::is_consistent));
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().expect("thread should not panic");
        }

        // 50 adds per worker, of which 17 (n = 0, 3, ..., 48) are deleted.
        shared.read(|store| {
            assert_eq!(store.len(), 4 * 33);
            assert!(store.is_consistent());
        });
    }
}
