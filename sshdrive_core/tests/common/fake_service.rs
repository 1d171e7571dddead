//! A deterministic **in‑process stand‑in** for the mount service.
//!
//! *  Seed it with profiles, mounts and free letters, then hand a clone to
//!    `SyncOrchestrator::new`; the clone shares state with the test's copy.
//! *  `fail(call)` makes a call return an error until `heal(call)`.
//! *  `delay(call, d)` makes a call sleep first, to force overlaps.
//! *  `lag(call, d)` applies the call, then sleeps before replying.
//! *  Every call is recorded in order; check them with `calls()`/`count()`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use sshdrive_core::{
    ConnectionProfile, DriveLetter, MountService, MountStatus, PrerequisiteState, ServiceError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    CheckPrerequisites,
    GetConnections,
    SaveConnection,
    DeleteConnection,
    GetAvailableDriveLetters,
    MountDrive,
    UnmountDrive,
    GetMountedDrives,
    TestConnection,
}

#[derive(Default)]
struct FakeState {
    prerequisites: PrerequisiteState,
    profiles: Vec<ConnectionProfile>,
    mounts: Vec<MountStatus>,
    letters: Vec<DriveLetter>,
    failing: HashSet<Call>,
    delays: HashMap<Call, Duration>,
    lags: HashMap<Call, Duration>,
    calls: Vec<Call>,
    next_id: usize,
}

#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn with_letters(self, letters: Vec<DriveLetter>) -> Self {
        self.lock().letters = letters;
        self
    }

    pub fn with_profile(self, profile: ConnectionProfile) -> Self {
        self.lock().profiles.push(profile);
        self
    }

    pub fn with_mount(self, status: MountStatus) -> Self {
        self.lock().mounts.push(status);
        self
    }

    pub fn with_prerequisites(self, prerequisites: PrerequisiteState) -> Self {
        self.lock().prerequisites = prerequisites;
        self
    }

    pub fn fail(&self, call: Call) {
        self.lock().failing.insert(call);
    }

    pub fn heal(&self, call: Call) {
        self.lock().failing.remove(&call);
    }

    pub fn delay(&self, call: Call, duration: Duration) {
        self.lock().delays.insert(call, duration);
    }

    pub fn lag(&self, call: Call, duration: Duration) {
        self.lock().lags.insert(call, duration);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn set_letters(&self, letters: Vec<DriveLetter>) {
        self.lock().letters = letters;
    }

    pub fn push_profile(&self, profile: ConnectionProfile) {
        self.lock().profiles.push(profile);
    }

    /// Records the call, sleeps if asked to, and errors if it is failing.
    async fn enter(&self, call: Call) -> Result<(), ServiceError> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(call);
            state.delays.get(&call).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.lock().failing.contains(&call) {
            return Err(ServiceError::Unavailable(format!("{call:?} failed on purpose")));
        }
        Ok(())
    }

    /// Sleeps between applying a call and replying, if asked to.
    async fn leave(&self, call: Call) {
        let lag = self.lock().lags.get(&call).copied();
        if let Some(lag) = lag {
            tokio::time::sleep(lag).await;
        }
    }
}

#[async_trait]
impl MountService for FakeService {
    async fn check_prerequisites(&self) -> Result<PrerequisiteState, ServiceError> {
        self.enter(Call::CheckPrerequisites).await?;
        Ok(self.lock().prerequisites.clone())
    }

    async fn get_connections(&self) -> Result<Vec<ConnectionProfile>, ServiceError> {
        self.enter(Call::GetConnections).await?;
        Ok(self.lock().profiles.clone())
    }

    async fn save_connection(
        &self,
        mut connection: ConnectionProfile,
        _password: Option<String>,
    ) -> Result<ConnectionProfile, ServiceError> {
        self.enter(Call::SaveConnection).await?;
        let mut state = self.lock();
        if connection.id.is_empty() {
            state.next_id += 1;
            connection.id = format!("conn-{}", state.next_id);
        }
        match state.profiles.iter_mut().find(|p| p.id == connection.id) {
            Some(existing) => *existing = connection.clone(),
            None => state.profiles.push(connection.clone()),
        }
        Ok(connection)
    }

    async fn delete_connection(&self, id: &str) -> Result<(), ServiceError> {
        self.enter(Call::DeleteConnection).await?;
        let mut state = self.lock();
        let before = state.profiles.len();
        state.profiles.retain(|p| p.id != id);
        if state.profiles.len() == before {
            return Err(ServiceError::NotFound(format!("no connection with id '{id}'")));
        }
        Ok(())
    }

    async fn get_available_drive_letters(&self) -> Result<Vec<DriveLetter>, ServiceError> {
        self.enter(Call::GetAvailableDriveLetters).await?;
        Ok(self.lock().letters.clone())
    }

    async fn mount_drive(
        &self,
        connection_id: &str,
        drive_letter: DriveLetter,
    ) -> Result<MountStatus, ServiceError> {
        self.enter(Call::MountDrive).await?;
        let status = {
            let mut state = self.lock();
            if !state.profiles.iter().any(|p| p.id == connection_id) {
                return Err(ServiceError::NotFound(format!("no connection with id '{connection_id}'")));
            }
            if state
                .mounts
                .iter()
                .any(|m| m.drive_letter == drive_letter && m.is_connected())
            {
                return Err(ServiceError::Rejected(format!("{drive_letter}: is in use")));
            }
            let status = MountStatus::connected(drive_letter, connection_id);
            state.mounts.retain(|m| m.drive_letter != drive_letter);
            state.mounts.push(status.clone());
            state.letters.retain(|l| *l != drive_letter);
            status
        };
        self.leave(Call::MountDrive).await;
        Ok(status)
    }

    async fn unmount_drive(&self, drive_letter: DriveLetter) -> Result<(), ServiceError> {
        self.enter(Call::UnmountDrive).await?;
        {
            let mut state = self.lock();
            let before = state.mounts.len();
            state.mounts.retain(|m| m.drive_letter != drive_letter);
            if state.mounts.len() == before {
                return Err(ServiceError::NotFound(format!("{drive_letter}: is not mounted")));
            }
            if !state.letters.contains(&drive_letter) {
                state.letters.push(drive_letter);
                state.letters.sort();
            }
        }
        self.leave(Call::UnmountDrive).await;
        Ok(())
    }

    async fn get_mounted_drives(&self) -> Result<Vec<MountStatus>, ServiceError> {
        self.enter(Call::GetMountedDrives).await?;
        Ok(self.lock().mounts.clone())
    }

    async fn test_connection(
        &self,
        _connection: &ConnectionProfile,
        _password: Option<&str>,
    ) -> Result<bool, ServiceError> {
        self.enter(Call::TestConnection).await?;
        Ok(true)
    }
}
