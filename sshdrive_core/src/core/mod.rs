pub mod connection_registry;
pub mod drive_pool;
pub mod errors;
pub mod key_guard;
pub mod mount_registry;
pub mod orchestrator;
pub mod projector;
pub mod signals;

// Re-export the modules here for easy import elsewhere.
pub use connection_registry::ConnectionRegistry;
pub use drive_pool::DriveLetterPool;
pub use errors::*;
pub use key_guard::{KeyedGuard, OperationKey};
pub use mount_registry::MountRegistry;
pub use orchestrator::SyncOrchestrator;
pub use projector::{project, ConnectionView};
pub use signals::{ErrorChannel, LoadingFlag, LoadingGuard};
