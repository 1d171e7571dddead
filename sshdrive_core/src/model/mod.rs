pub mod drive_letter;
pub mod mount;
pub mod prerequisites;
pub mod profile;

// Re-export the modules here for easy import elsewhere.
pub use drive_letter::*;
pub use mount::*;
pub use prerequisites::*;
pub use profile::*;
