use serde::{Deserialize, Serialize};

use super::drive_letter::DriveLetter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountState {
    Connected,
    Disconnected,
    Error,
}

/// A mount reported by the service: which connection sits on which letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountStatus {
    pub drive_letter: DriveLetter,
    pub connection_id: String,
    #[serde(rename = "status")]
    pub state: MountState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MountStatus {
    pub fn connected(drive_letter: DriveLetter, connection_id: impl Into<String>) -> Self {
        Self {
            drive_letter,
            connection_id: connection_id.into(),
            state: MountState::Connected,
            error_message: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == MountState::Connected
    }
}
