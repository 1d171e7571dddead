#![allow(dead_code)]

pub mod fake_service;

use log::LevelFilter;
use sshdrive_core::{AuthType, ConnectionProfile, DriveLetter};

/// Logs appear only when you run with `-- --nocapture` or when a test fails.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn letter(c: char) -> DriveLetter {
    DriveLetter::new(c).expect("test letters are ASCII")
}

pub fn letters(chars: &str) -> Vec<DriveLetter> {
    chars.chars().map(letter).collect()
}

pub fn profile(id: &str, name: &str) -> ConnectionProfile {
    ConnectionProfile {
        id: id.into(),
        name: name.into(),
        host: "10.0.0.1".into(),
        port: 22,
        username: "u".into(),
        auth_type: AuthType::Password,
        key_path: None,
        remote_path: "/".into(),
        preferred_drive_letter: None,
    }
}
