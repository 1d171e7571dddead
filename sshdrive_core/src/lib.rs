pub mod core;
pub mod model;
pub mod service;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::core::errors::{InvariantViolation, Operation, SyncError, SyncResult};
pub use crate::core::orchestrator::SyncOrchestrator;
pub use crate::core::projector::ConnectionView;
pub use model::{
    AuthType, ConnectionDraft, ConnectionProfile, DriveLetter, MountState, MountStatus,
    PrerequisiteState,
};
pub use service::{LocalService, MountService, ServiceError};
pub use storage::{ProfileStore, Settings};
