use super::errors::InvariantViolation;
use crate::model::{DriveLetter, MountStatus};

/// Local mirror of the mounts the service knows about.
///
/// A letter hosts at most one entry, and a connection has at most one
/// `connected` entry.
#[derive(Debug, Clone, Default)]
pub struct MountRegistry {
    mounts: Vec<MountStatus>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache, validating the snapshot entry by entry. On a
    /// violation the previous contents are kept.
    pub fn load(&mut self, statuses: Vec<MountStatus>) -> Result<(), InvariantViolation> {
        let mut staged = MountRegistry::new();
        for status in statuses {
            staged.add(status)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn add(&mut self, status: MountStatus) -> Result<(), InvariantViolation> {
        if self.get(status.drive_letter).is_some() {
            return Err(InvariantViolation::LetterInUse(status.drive_letter));
        }
        if status.is_connected() && self.connected_for(&status.connection_id).is_some() {
            return Err(InvariantViolation::ConnectionAlreadyMounted(
                status.connection_id,
            ));
        }
        self.mounts.push(status);
        Ok(())
    }

    pub fn remove(&mut self, letter: DriveLetter) -> Option<MountStatus> {
        let index = self.mounts.iter().position(|m| m.drive_letter == letter)?;
        Some(self.mounts.remove(index))
    }

    /// Drops the entry on `letter` unless it is `connected`.
    pub fn remove_stale(&mut self, letter: DriveLetter) -> Option<MountStatus> {
        if self.get(letter)?.is_connected() {
            return None;
        }
        self.remove(letter)
    }

    pub fn get(&self, letter: DriveLetter) -> Option<&MountStatus> {
        self.mounts.iter().find(|m| m.drive_letter == letter)
    }

    /// The `connected` entry for a connection, if it is mounted.
    pub fn connected_for(&self, connection_id: &str) -> Option<&MountStatus> {
        self.mounts
            .iter()
            .find(|m| m.is_connected() && m.connection_id == connection_id)
    }

    pub fn connected_letters(&self) -> impl Iterator<Item = DriveLetter> + '_ {
        self.mounts
            .iter()
            .filter(|m| m.is_connected())
            .map(|m| m.drive_letter)
    }

    pub fn mounts(&self) -> &[MountStatus] {
        &self.mounts
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}
