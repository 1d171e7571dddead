use std::collections::{BTreeMap, HashMap};
use std::io;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::Mutex;

use super::{MountService, ServiceError};
use crate::model::{AuthType, ConnectionProfile, DriveLetter, MountStatus, PrerequisiteState};
use crate::storage::{ProfileStore, Settings};

#[derive(Default)]
struct LocalState {
    passwords: HashMap<String, String>,
    mounts: BTreeMap<DriveLetter, MountStatus>,
}

/// A mount service that runs in-process.
///
/// Profiles are persisted through a [`ProfileStore`]. Mounts are recorded
/// but no filesystem is attached, and passwords live only as long as the
/// process. Good enough to drive the CLI and to work offline.
pub struct LocalService {
    store: ProfileStore,
    letters: Vec<DriveLetter>,
    prerequisites: PrerequisiteState,
    state: Mutex<LocalState>,
}

impl LocalService {
    pub fn new(store: ProfileStore, settings: &Settings) -> Self {
        Self {
            store,
            letters: settings.drive_letters(),
            prerequisites: settings.prerequisites.clone(),
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Uses `settings.data_dir` when set, the platform data dir otherwise.
    pub fn from_settings(settings: &Settings) -> io::Result<Self> {
        let store = match &settings.data_dir {
            Some(dir) => ProfileStore::at(dir),
            None => ProfileStore::new()?,
        };
        Ok(Self::new(store, settings))
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    fn find_profile(&self, id: &str) -> Result<ConnectionProfile, ServiceError> {
        self.store
            .load()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("no connection with id '{id}'")))
    }
}

/// A letter whose root already exists belongs to some other volume.
fn letter_is_taken_by_system(letter: DriveLetter) -> bool {
    cfg!(windows) && std::path::Path::new(&letter.root()).exists()
}

#[async_trait]
impl MountService for LocalService {
    async fn check_prerequisites(&self) -> Result<PrerequisiteState, ServiceError> {
        Ok(self.prerequisites.clone())
    }

    async fn get_connections(&self) -> Result<Vec<ConnectionProfile>, ServiceError> {
        Ok(self.store.load()?)
    }

    async fn save_connection(
        &self,
        mut connection: ConnectionProfile,
        password: Option<String>,
    ) -> Result<ConnectionProfile, ServiceError> {
        let mut state = self.state.lock().await;
        if connection.is_new() {
            connection.id = uuid::Uuid::new_v4().to_string();
        }
        if connection.auth_type == AuthType::Password {
            if let Some(password) = password {
                state.passwords.insert(connection.id.clone(), password);
            }
        }

        let mut profiles = self.store.load()?;
        match profiles.iter_mut().find(|p| p.id == connection.id) {
            Some(existing) => *existing = connection.clone(),
            None => profiles.push(connection.clone()),
        }
        self.store.save(&profiles)?;
        info!("Saved connection '{}' ({})", connection.name, connection.id);
        Ok(connection)
    }

    async fn delete_connection(&self, id: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        state.passwords.remove(id);

        let mut profiles = self.store.load()?;
        profiles.retain(|p| p.id != id);
        self.store.save(&profiles)?;
        info!("Deleted connection {}", id);
        Ok(())
    }

    async fn get_available_drive_letters(&self) -> Result<Vec<DriveLetter>, ServiceError> {
        let state = self.state.lock().await;
        Ok(self
            .letters
            .iter()
            .copied()
            .filter(|letter| !state.mounts.contains_key(letter))
            .filter(|letter| !letter_is_taken_by_system(*letter))
            .collect())
    }

    async fn mount_drive(
        &self,
        connection_id: &str,
        drive_letter: DriveLetter,
    ) -> Result<MountStatus, ServiceError> {
        let connection = self.find_profile(connection_id)?;
        let mut state = self.state.lock().await;

        if state.mounts.contains_key(&drive_letter) || letter_is_taken_by_system(drive_letter) {
            return Err(ServiceError::Rejected(format!(
                "drive {drive_letter}: is already in use"
            )));
        }
        if state
            .mounts
            .values()
            .any(|m| m.connection_id == connection.id && m.is_connected())
        {
            return Err(ServiceError::Rejected(format!(
                "connection '{}' is already mounted",
                connection.name
            )));
        }

        let status = MountStatus::connected(drive_letter, connection.id.clone());
        state.mounts.insert(drive_letter, status.clone());
        info!(
            "Mounted {}{} on {}:",
            connection.endpoint(),
            connection.remote_path,
            drive_letter
        );
        Ok(status)
    }

    async fn unmount_drive(&self, drive_letter: DriveLetter) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        match state.mounts.remove(&drive_letter) {
            Some(status) => {
                info!("Unmounted {}: ({})", drive_letter, status.connection_id);
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!(
                "drive {drive_letter}: is not mounted"
            ))),
        }
    }

    async fn get_mounted_drives(&self) -> Result<Vec<MountStatus>, ServiceError> {
        let state = self.state.lock().await;
        Ok(state.mounts.values().cloned().collect())
    }

    async fn test_connection(
        &self,
        connection: &ConnectionProfile,
        password: Option<&str>,
    ) -> Result<bool, ServiceError> {
        let password = match password {
            Some(password) => Some(password.to_string()),
            None => self.state.lock().await.passwords.get(&connection.id).cloned(),
        };
        debug!("Testing connection to {}", connection.endpoint());
        probe(connection.clone(), password).await
    }
}

#[cfg(feature = "ssh")]
async fn probe(connection: ConnectionProfile, password: Option<String>) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || super::ssh::probe(&connection, password.as_deref()))
        .await
        .map_err(|e| ServiceError::Unavailable(format!("connection test aborted: {e}")))?
}

/// Without SSH support the best we can say is whether the port answers.
#[cfg(not(feature = "ssh"))]
async fn probe(connection: ConnectionProfile, _password: Option<String>) -> Result<bool, ServiceError> {
    use std::time::Duration;
    use tokio::net::TcpStream;

    let addr = (connection.host.as_str(), connection.port);
    match tokio::time::timeout(Duration::from_secs(10), TcpStream::connect(addr)).await {
        Ok(Ok(_)) => Ok(true),
        Ok(Err(e)) => Err(ServiceError::Unavailable(format!(
            "cannot reach {}:{}: {e}",
            connection.host, connection.port
        ))),
        Err(_) => Err(ServiceError::Unavailable(format!(
            "timed out reaching {}:{}",
            connection.host, connection.port
        ))),
    }
}
