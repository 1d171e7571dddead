pub mod errors;
pub mod local;
#[cfg(feature = "ssh")]
pub mod ssh;

use async_trait::async_trait;

use crate::model::{ConnectionProfile, DriveLetter, MountStatus, PrerequisiteState};

pub use errors::ServiceError;
pub use local::LocalService;

/// The mount-management service that owns the real state.
///
/// It handles transport, credentials and the filesystem attachment; the
/// orchestrator only caches what these calls return. Drive letters cross
/// the boundary as [`DriveLetter`], so they are always a single character.
#[async_trait]
pub trait MountService: Send + Sync {
    async fn check_prerequisites(&self) -> Result<PrerequisiteState, ServiceError>;

    async fn get_connections(&self) -> Result<Vec<ConnectionProfile>, ServiceError>;

    /// Saves `connection` and returns the canonical copy. An empty id asks
    /// the service to assign one.
    async fn save_connection(
        &self,
        connection: ConnectionProfile,
        password: Option<String>,
    ) -> Result<ConnectionProfile, ServiceError>;

    async fn delete_connection(&self, id: &str) -> Result<(), ServiceError>;

    async fn get_available_drive_letters(&self) -> Result<Vec<DriveLetter>, ServiceError>;

    async fn mount_drive(
        &self,
        connection_id: &str,
        drive_letter: DriveLetter,
    ) -> Result<MountStatus, ServiceError>;

    async fn unmount_drive(&self, drive_letter: DriveLetter) -> Result<(), ServiceError>;

    async fn get_mounted_drives(&self) -> Result<Vec<MountStatus>, ServiceError>;

    async fn test_connection(
        &self,
        connection: &ConnectionProfile,
        password: Option<&str>,
    ) -> Result<bool, ServiceError>;
}
