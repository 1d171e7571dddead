use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::drive_letter::{DriveLetter, DriveLetterError};

/// How the remote end authenticates the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Password,
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("port must be between 1 and 65535")]
    InvalidPort,
    #[error("key authentication requires a key path")]
    MissingKeyPath,
    #[error("password authentication does not take a key path")]
    UnexpectedKeyPath,
    #[error("invalid drive letter: {0}")]
    DriveLetter(#[from] DriveLetterError),
}

/// A saved SSH endpoint that can be mounted as a drive.
///
/// `id` is assigned by the mount service on first save; an empty id marks a
/// profile that has never been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    pub remote_path: String,
    #[serde(
        default,
        rename = "drive_letter",
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_drive_letter: Option<DriveLetter>,
}

impl ConnectionProfile {
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    /// `user@host:port`, for logs and listings.
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    /// Checks the rules a profile must satisfy before it is sent anywhere.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.port == 0 {
            return Err(ProfileError::InvalidPort);
        }
        match (self.auth_type, self.key_path.as_deref()) {
            (AuthType::Key, None) => Err(ProfileError::MissingKeyPath),
            (AuthType::Key, Some(path)) if path.trim().is_empty() => {
                Err(ProfileError::MissingKeyPath)
            }
            (AuthType::Password, Some(_)) => Err(ProfileError::UnexpectedKeyPath),
            _ => Ok(()),
        }
    }
}

/// Raw form input for a connection profile.
///
/// Optional fields arrive as possibly-empty strings; [`ConnectionDraft::into_profile`]
/// turns empty strings into `None` so the service never sees `""` where it
/// expects "no preference".
#[derive(Debug, Clone, Default)]
pub struct ConnectionDraft {
    pub id: Option<String>,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    pub key_path: String,
    pub remote_path: String,
    pub drive_letter: String,
}

impl ConnectionDraft {
    pub fn into_profile(self) -> Result<ConnectionProfile, ProfileError> {
        let name = required("name", self.name)?;
        let host = required("host", self.host)?;
        let username = required("username", self.username)?;

        let key_path = match self.auth_type {
            AuthType::Key => Some(non_empty(self.key_path).ok_or(ProfileError::MissingKeyPath)?),
            AuthType::Password => None,
        };
        let preferred_drive_letter = non_empty(self.drive_letter)
            .map(|letter| DriveLetter::parse(&letter))
            .transpose()?;

        let profile = ConnectionProfile {
            id: self.id.map(|id| id.trim().to_string()).unwrap_or_default(),
            name,
            host,
            port: self.port,
            username,
            auth_type: self.auth_type,
            key_path,
            remote_path: self.remote_path.trim().to_string(),
            preferred_drive_letter,
        };
        profile.validate()?;
        Ok(profile)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(field: &'static str, value: String) -> Result<String, ProfileError> {
    non_empty(value).ok_or(ProfileError::EmptyField(field))
}
