use std::collections::BTreeSet;

use super::errors::InvariantViolation;
use crate::model::DriveLetter;

/// The drive letters that are free to mount on, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveLetterPool {
    available: BTreeSet<DriveLetter>,
}

impl DriveLetterPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole pool.
    pub fn load(&mut self, letters: impl IntoIterator<Item = DriveLetter>) {
        self.available = letters.into_iter().collect();
    }

    /// Takes `letter` out of the pool. Reserving a letter that is not there is
    /// a no-op; another caller may have reserved it already.
    pub fn reserve(&mut self, letter: DriveLetter) -> bool {
        self.available.remove(&letter)
    }

    /// Puts `letter` back. Releasing a letter that is already free means a
    /// mount/unmount pair got out of step somewhere upstream.
    pub fn release(&mut self, letter: DriveLetter) -> Result<(), InvariantViolation> {
        if self.available.insert(letter) {
            Ok(())
        } else {
            Err(InvariantViolation::LetterAlreadyAvailable(letter))
        }
    }

    /// Puts `letter` back whether or not it is already free. Returns true if
    /// it was missing.
    pub fn restore(&mut self, letter: DriveLetter) -> bool {
        self.available.insert(letter)
    }

    pub fn contains(&self, letter: DriveLetter) -> bool {
        self.available.contains(&letter)
    }

    /// Lowest free letter, the natural default for a new mount.
    pub fn first(&self) -> Option<DriveLetter> {
        self.available.first().copied()
    }

    pub fn letters(&self) -> Vec<DriveLetter> {
        self.available.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}
