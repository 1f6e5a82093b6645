//! Per-slot mutual exclusion.
//!
//! Replacing the picture in a unique category is a read-modify-write against
//! the record store. [`SlotLocks`] serialises those sequences for the same
//! (owner, category) pair inside one process; writers in other processes
//! still race and the last update wins.
//!
//! A slot's entry lives only while some thread holds or waits on it, so the
//! map stays as small as the number of slots currently in use.

use std::sync::Arc;

use dashmap::DashMap;
use gallery_core::{BloggerId, PictureCategory};
use parking_lot::Mutex;

type SlotKey = (BloggerId, PictureCategory);

#[derive(Default)]
pub struct SlotLocks {
    slots: DashMap<SlotKey, Arc<Mutex<()>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `(owner_id, category)`.
    pub fn with_slot<T>(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
        f: impl FnOnce() -> T,
    ) -> T {
        let key = (owner_id, category);
        // Clone the handle out so the map shard is not held while `f` runs.
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let out = {
            let _guard = slot.lock();
            f()
        };

        // Two handles left means the map's and ours: nobody else is waiting.
        self.slots
            .remove_if(&key, |_, held| Arc::strong_count(held) == 2);
        out
    }

    /// Number of slots currently held or waited on.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
