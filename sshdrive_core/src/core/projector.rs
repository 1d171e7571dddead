use std::collections::HashMap;

use serde::Serialize;

use crate::model::{ConnectionProfile, DriveLetter, MountStatus};

/// A connection profile as the user sees it: the profile plus its mount.
///
/// Derived on demand from the two registries; it has no identity beyond the
/// profile's id and is never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionView {
    #[serde(flatten)]
    pub profile: ConnectionProfile,
    pub is_connected: bool,
    pub mounted_drive_letter: Option<DriveLetter>,
}

impl ConnectionView {
    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

/// Joins profiles with mounts, keeping the profiles' order.
///
/// When a connection has several mount entries the `connected` one wins,
/// otherwise the first one listed.
pub fn project(profiles: &[ConnectionProfile], mounts: &[MountStatus]) -> Vec<ConnectionView> {
    let mut by_connection: HashMap<&str, &MountStatus> = HashMap::with_capacity(mounts.len());
    for mount in mounts {
        by_connection
            .entry(mount.connection_id.as_str())
            .and_modify(|current| {
                if mount.is_connected() && !current.is_connected() {
                    *current = mount;
                }
            })
            .or_insert(mount);
    }

    profiles
        .iter()
        .map(|profile| {
            let mount = by_connection.get(profile.id.as_str());
            ConnectionView {
                profile: profile.clone(),
                is_connected: mount.is_some_and(|m| m.is_connected()),
                mounted_drive_letter: mount.map(|m| m.drive_letter),
            }
        })
        .collect()
}
