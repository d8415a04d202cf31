//! External mode signals.
//!
//! A [`ModeProbe`] answers "should data come from the simulation right now?"
//! from some source outside the process state: an environment variable, a
//! remote feature flag, a config service. Probes may fail; `ModeStore`
//! treats every failure as "keep the last known mode".

use async_trait::async_trait;
use backoffice_core::Mode;

/// Reasons a probe could not produce a mode.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("mode source unreachable: {0}")]
    Unreachable(String),
    #[error("mode signal {0:?} is not set")]
    Unset(String),
    #[error("mode signal has unrecognized value {0:?}")]
    Unparsable(String),
    #[error("mode probe timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Boolean-producing external mode source.
#[async_trait]
pub trait ModeProbe: Send + Sync {
    /// Reads the current mode from the source.
    async fn probe(&self) -> Result<Mode, ProbeError>;
}

/// Reads the mode from an environment variable on every probe.
///
/// Accepts the spellings understood by [`Mode`]'s `FromStr` (`mock`, `live`,
/// `true`, `0`, `on`, ...). Unset and unparsable values are probe failures.
#[derive(Debug, Clone)]
pub struct EnvModeProbe {
    var: String,
}

impl EnvModeProbe {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable consulted.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl ModeProbe for EnvModeProbe {
    async fn probe(&self) -> Result<Mode, ProbeError> {
        let raw = std::env::var(&self.var).map_err(|_| ProbeError::Unset(self.var.clone()))?;
        raw.parse::<Mode>()
            .map_err(|_| ProbeError::Unparsable(raw.clone()))
    }
}
