//! Single-slot signals the presentation layer watches: the last error and
//! whether a refresh is in flight.

use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::watch;

/// Holds the most recent failure message. A new failure overwrites the old
/// one; nothing is queued.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    slot: Arc<watch::Sender<Option<String>>>,
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn publish(&self, error: impl Display) {
        self.slot.send_replace(Some(error.to_string()));
    }

    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    pub fn current(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.slot.subscribe()
    }
}

/// True while at least one [`LoadingGuard`] is alive.
///
/// The number of live guards is the watched value itself, so raising and
/// lowering are single updates under the channel's lock.
#[derive(Debug, Clone)]
pub struct LoadingFlag {
    active: Arc<watch::Sender<usize>>,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (active, _) = watch::channel(0);
        Self {
            active: Arc::new(active),
        }
    }

    /// Raises the flag until the returned guard is dropped, whatever way the
    /// surrounding operation ends.
    pub fn begin(&self) -> LoadingGuard {
        self.active.send_modify(|count| *count += 1);
        LoadingGuard { flag: self.clone() }
    }

    pub fn is_loading(&self) -> bool {
        *self.active.borrow() > 0
    }

    /// Watches the number of loads in flight; zero means idle.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.active.subscribe()
    }
}

#[must_use = "the loading flag drops as soon as the guard does"]
#[derive(Debug)]
pub struct LoadingGuard {
    flag: LoadingFlag,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag
            .active
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
