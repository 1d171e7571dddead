use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveLetterError {
    #[error("drive letter is empty")]
    Empty,
    #[error("'{0}' is not a drive letter")]
    NotALetter(char),
}

/// A single mount target, e.g. the `E` of `E:\`.
///
/// Always an uppercase ASCII letter. Ordering is alphabetical so pools of
/// letters sort the way users expect to see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct DriveLetter(char);

impl DriveLetter {
    pub fn new(letter: char) -> Result<Self, DriveLetterError> {
        if letter.is_ascii_alphabetic() {
            Ok(Self(letter.to_ascii_uppercase()))
        } else {
            Err(DriveLetterError::NotALetter(letter))
        }
    }

    /// For letters known at compile time.
    pub(crate) const fn from_static(letter: char) -> Self {
        assert!(letter.is_ascii_uppercase());
        Self(letter)
    }

    /// Parses user input by looking at its first character only, so `"e"`,
    /// `"E:"` and `"E:\\"` all name the same letter.
    pub fn parse(input: &str) -> Result<Self, DriveLetterError> {
        let first = input
            .trim()
            .chars()
            .next()
            .ok_or(DriveLetterError::Empty)?;
        Self::new(first)
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// Root path of the mounted volume (`E:\`).
    pub fn root(self) -> String {
        format!("{}:\\", self.0)
    }

    /// Every letter from `first` to `last`, both inclusive.
    pub fn range(first: DriveLetter, last: DriveLetter) -> impl Iterator<Item = DriveLetter> {
        (first.0..=last.0).map(DriveLetter)
    }
}

impl TryFrom<char> for DriveLetter {
    type Error = DriveLetterError;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Self::new(letter)
    }
}

impl From<DriveLetter> for char {
    fn from(letter: DriveLetter) -> char {
        letter.0
    }
}

impl FromStr for DriveLetter {
    type Err = DriveLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for DriveLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
