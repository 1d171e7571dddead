use std::fmt::{self, Display};

use thiserror::Error;

use crate::model::{DriveLetter, ProfileError};
use crate::service::ServiceError;

/// A cache or pool constraint that an operation would have broken.
///
/// Seeing one of these means the caller is confused or the local cache has
/// drifted from the service; a refresh re-synchronizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("drive letter {0} already hosts a mount")]
    LetterInUse(DriveLetter),
    #[error("connection '{0}' is already mounted")]
    ConnectionAlreadyMounted(String),
    #[error("drive letter {0} is already available")]
    LetterAlreadyAvailable(DriveLetter),
    #[error("duplicate connection id '{0}'")]
    DuplicateConnectionId(String),
    #[error("connection profile has no id")]
    MissingConnectionId,
}

/// The remote operations that can fail after a call to the mount service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SaveConnection,
    DeleteConnection,
    MountDrive,
    UnmountDrive,
    TestConnection,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SaveConnection => "save_connection",
            Operation::DeleteConnection => "delete_connection",
            Operation::MountDrive => "mount_drive",
            Operation::UnmountDrive => "unmount_drive",
            Operation::TestConnection => "test_connection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// One of the refresh fetches failed; nothing was committed.
    #[error("refresh failed: {cause}")]
    SyncFailed { cause: ServiceError },
    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),
    #[error("{operation} failed: {cause}")]
    RemoteCallFailed {
        operation: Operation,
        cause: ServiceError,
    },
    #[error("invalid connection profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

impl SyncError {
    pub fn remote(operation: Operation, cause: ServiceError) -> Self {
        SyncError::RemoteCallFailed { operation, cause }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
