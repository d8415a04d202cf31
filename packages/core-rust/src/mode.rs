//! Data mode: whether operations are served by the simulation or the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which data path serves an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Locally simulated data and key-value-backed settings.
    Mock,
    /// The remote backend.
    Live,
}

impl Mode {
    /// Returns `true` for [`Mode::Mock`].
    #[must_use]
    pub fn is_mock(self) -> bool {
        matches!(self, Mode::Mock)
    }

    /// Stable lowercase name, used in logs, metrics labels and persisted overrides.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Mock => "mock",
            Mode::Live => "live",
        }
    }

    /// Maps a boolean flag (`true` = mock) to a mode.
    #[must_use]
    pub fn from_mock_flag(mock: bool) -> Self {
        if mock {
            Mode::Mock
        } else {
            Mode::Live
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized data mode: {0:?}")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    /// Accepts mode names and the usual boolean spellings of a "mock" flag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" | "1" | "true" | "yes" | "on" => Ok(Mode::Mock),
            "live" | "0" | "false" | "no" | "off" => Ok(Mode::Live),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
