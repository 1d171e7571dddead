use std::{fs, io, path::Path, path::PathBuf};

use directories::ProjectDirs;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use super::APP_NAME;
use crate::model::{DriveLetter, PrerequisiteState};

const SETTINGS_FILE: &str = "settings.json";
const FIRST_LETTER: DriveLetter = DriveLetter::from_static('D');
const LAST_LETTER: DriveLetter = DriveLetter::from_static('Z');

/// User settings, read from `settings.json` in the config directory.
///
/// Every field has a default, so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where profiles are stored; the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
    pub first_drive_letter: DriveLetter,
    pub last_drive_letter: DriveLetter,
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
    /// What the local backend reports for installed prerequisites.
    pub prerequisites: PrerequisiteState,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            first_drive_letter: FIRST_LETTER,
            last_drive_letter: LAST_LETTER,
            log_level: "info".into(),
            prerequisites: PrerequisiteState {
                winfsp_installed: true,
                sshfs_installed: true,
                winfsp_path: None,
                sshfs_path: Some("builtin".into()),
            },
        }
    }
}

impl Settings {
    /// Default location: `~/.config/sshdrive/settings.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|proj| proj.config_dir().join(SETTINGS_FILE))
    }

    /// Loads settings from the default location, falling back to defaults.
    pub fn load() -> io::Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        match fs::File::open(path) {
            Ok(file) => serde_json::from_reader(io::BufReader::new(file)).map_err(SerdeError::into),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// The letters the local backend may hand out, in order.
    pub fn drive_letters(&self) -> Vec<DriveLetter> {
        DriveLetter::range(self.first_drive_letter, self.last_drive_letter).collect()
    }

    /// Parsed `log_level`; unknown values fall back to `Info`.
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
