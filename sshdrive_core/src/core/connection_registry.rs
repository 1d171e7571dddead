use std::collections::HashSet;

use super::errors::InvariantViolation;
use crate::model::ConnectionProfile;

/// Local mirror of the saved connection profiles, in service order.
///
/// Never talks to the service itself; the orchestrator hands it results.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    profiles: Vec<ConnectionProfile>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache. A snapshot with a missing or repeated id is
    /// rejected and the previous contents are kept.
    pub fn load(&mut self, profiles: Vec<ConnectionProfile>) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(profiles.len());
        for profile in &profiles {
            if profile.is_new() {
                return Err(InvariantViolation::MissingConnectionId);
            }
            if !seen.insert(profile.id.as_str()) {
                return Err(InvariantViolation::DuplicateConnectionId(profile.id.clone()));
            }
        }
        self.profiles = profiles;
        Ok(())
    }

    /// Replaces the profile with the same id in place, or appends it.
    /// Returns `true` when the profile was new.
    pub fn upsert(&mut self, profile: ConnectionProfile) -> Result<bool, InvariantViolation> {
        if profile.is_new() {
            return Err(InvariantViolation::MissingConnectionId);
        }
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                *existing = profile;
                Ok(false)
            }
            None => {
                self.profiles.push(profile);
                Ok(true)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ConnectionProfile> {
        let index = self.profiles.iter().position(|p| p.id == id)?;
        Some(self.profiles.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
