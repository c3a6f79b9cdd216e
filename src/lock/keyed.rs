// Sqlauth - Keyed Mutex Registry
//
// A concurrent map from key to a `parking_lot` mutex, created lazily on
// first use. The map itself is only touched while finding or creating a
// slot; the slot is what callers block on. Holding a `KeyedGuard` is holding
// the lock, dropping it is the release, so every exit path (early return,
// `?`, panic) unlocks. Release is a fair unlock: a parked waiter is handed
// the lock directly and cannot be overtaken by a caller arriving later.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};

type KeySlot = Mutex<()>;

/// Per-key mutual exclusion.
///
/// The slot table grows by one entry per distinct key ever locked. Call
/// [`KeyedMutex::prune_idle`] to drop slots nobody holds or waits on.
#[derive(Default)]
pub struct KeyedMutex {
    slots: DashMap<String, Arc<KeySlot>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other caller holds `key`, then hold it until the
    /// returned guard is dropped.
    pub fn lock(&self, key: &str) -> KeyedGuard {
        let slot = self.slot(key);
        KeyedGuard {
            key: key.to_owned(),
            held: Some(slot.lock_arc()),
        }
    }

    /// Take `key` only if it is free right now.
    pub fn try_lock(&self, key: &str) -> Option<KeyedGuard> {
        let held = self.slot(key).try_lock_arc()?;
        Some(KeyedGuard {
            key: key.to_owned(),
            held: Some(held),
        })
    }

    /// Number of slots in the table, held or idle.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove slots that no guard or waiter references. Returns how many
    /// were dropped.
    pub fn prune_idle(&self) -> usize {
        let before = self.slots.len();
        // A guard or a blocked `lock` call each own a clone of the slot.
        self.slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        before.saturating_sub(self.slots.len())
    }

    fn slot(&self, key: &str) -> Arc<KeySlot> {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(key.to_owned()).or_default().value())
    }
}

impl fmt::Debug for KeyedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMutex")
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Proof of holding one key in a [`KeyedMutex`]. Releases on drop.
#[must_use = "the key is released as soon as the guard is dropped"]
pub struct KeyedGuard {
    key: String,
    // Always `Some` until drop.
    held: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl KeyedGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        if let Some(held) = self.held.take() {
            ArcMutexGuard::unlock_fair(held);
        }
    }
}

impl fmt::Debug for KeyedGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedGuard").field("key", &self.key).finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
