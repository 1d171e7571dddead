use serde::{Deserialize, Serialize};

/// Whether the native pieces a mount needs are installed on this machine.
///
/// Read-only: it is replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteState {
    pub winfsp_installed: bool,
    pub sshfs_installed: bool,
    #[serde(default)]
    pub winfsp_path: Option<String>,
    #[serde(default)]
    pub sshfs_path: Option<String>,
}

impl PrerequisiteState {
    pub fn is_ready(&self) -> bool {
        self.winfsp_installed && self.sshfs_installed
    }
}
