pub mod settings;
pub mod store;

pub use settings::Settings;
pub use store::ProfileStore;

pub(crate) const APP_NAME: &str = "sshdrive";
