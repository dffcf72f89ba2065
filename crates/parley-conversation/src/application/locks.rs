//! Per-character critical sections.
//!
//! Conversation commands for one character read, modify and write back the
//! same registry entry. Holding the character's lock for the whole command
//! keeps concurrent deliveries from interleaving those cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use parley_core::tenant::TenantId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Key = (TenantId, u32);

/// Keyed async mutex over (tenant, character).
#[derive(Debug, Default)]
pub struct CharacterLocks {
    entries: Mutex<HashMap<Key, Slot>>,
}

/// A key's mutex plus the number of callers holding or awaiting it.
#[derive(Debug, Default)]
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    claims: usize,
}

/// Held while a command runs for one character. Dropping the last claim on a
/// key, whether it was granted or abandoned while waiting, prunes its entry.
#[derive(Debug)]
pub struct CharacterGuard<'a> {
    locks: &'a CharacterLocks,
    key: Key,
    guard: Option<OwnedMutexGuard<()>>,
}

impl CharacterLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other command holds the character, then claims it.
    pub async fn lock(&self, tenant: TenantId, character_id: u32) -> CharacterGuard<'_> {
        let key = (tenant, character_id);
        let mutex = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = entries.entry(key).or_default();
            slot.claims += 1;
            Arc::clone(&slot.mutex)
        };
        // Built before waiting so a cancelled caller still gives up its claim.
        let mut claim = CharacterGuard {
            locks: self,
            key,
            guard: None,
        };
        claim.guard = Some(mutex.lock_owned().await);
        claim
    }

    fn release(&self, key: &Key) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = entries.get_mut(key) {
            slot.claims = slot.claims.saturating_sub(1);
            if slot.claims == 0 {
                entries.remove(key);
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for CharacterGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.key);
    }
}
