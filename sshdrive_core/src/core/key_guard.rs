use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::model::DriveLetter;

/// What a mutation touches. Operations sharing a key run one after another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKey {
    Letter(DriveLetter),
    Connection(String),
}

type LockTable = HashMap<OperationKey, Arc<AsyncMutex<()>>>;

/// Per-key mutual exclusion for mutations on the same drive letter or
/// connection.
///
/// Keys are always taken in sorted order, so two operations with overlapping
/// key sets cannot deadlock. Table entries disappear once nobody holds or
/// waits on them.
#[derive(Debug, Default)]
pub struct KeyedGuard {
    locks: Arc<Mutex<LockTable>>,
}

impl KeyedGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until every key in `keys` is free, then holds them until the
    /// returned lease is dropped.
    pub async fn acquire(&self, mut keys: Vec<OperationKey>) -> KeyLease {
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let lock = {
                let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
                table.entry(key.clone()).or_default().clone()
            };
            if lock.try_lock().is_err() {
                debug!("waiting for pending operation on {:?}", key);
            }
            guards.push(lock.lock_owned().await);
        }

        KeyLease {
            locks: Arc::clone(&self.locks),
            keys,
            guards,
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub struct KeyLease {
    locks: Arc<Mutex<LockTable>>,
    keys: Vec<OperationKey>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl Drop for KeyLease {
    fn drop(&mut self) {
        self.guards.clear();
        let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        for key in &self.keys {
            // only the table itself still points at an idle lock
            if table.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                table.remove(key);
            }
        }
    }
}
