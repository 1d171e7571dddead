use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use log::debug;
use serde_json::Error as SerdeError;

use super::APP_NAME;
use crate::model::ConnectionProfile;

const CONNECTIONS_FILE: &str = "connections.json";

/// Saved connection profiles as one pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// `~/.local/share/sshdrive` on Linux, `%APPDATA%\sshdrive\data` on Windows, etc.
    pub fn new() -> io::Result<Self> {
        let proj = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to locate data dir"))?;
        Ok(Self::at(proj.data_dir()))
    }

    /// A store rooted at `dir`; the directory is created on first save.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONNECTIONS_FILE)
    }

    /// Every stored profile; an absent file means none yet.
    pub fn load(&self) -> io::Result<Vec<ConnectionProfile>> {
        let path = self.path();
        match fs::File::open(&path) {
            Ok(file) => serde_json::from_reader(io::BufReader::new(file)).map_err(SerdeError::into),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No profile file at {:?} yet", path);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrites the file with `profiles`.
    pub fn save(&self, profiles: &[ConnectionProfile]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let file = fs::File::create(self.path())?;
        serde_json::to_writer_pretty(file, profiles).map_err(SerdeError::into)
    }
}
