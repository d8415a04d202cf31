//! Error taxonomy for facade operations.
//!
//! Every facade returns [`DataError`], which is either a remote failure
//! (the backend was unreachable or rejected the call) or a local-state
//! failure (the simulation or the persisted settings could not serve it).
//! Callers branch on [`DataError::kind`]: remote failures are worth a retry,
//! local ones call for falling back to defaults.
//!
//! Mode probe failures never appear here; `ModeStore` recovers them itself.

use backoffice_core::{Domain, SettingsError};

use crate::backend::RemoteError;
use crate::storage::StoreError;

/// Failure of the mock data path.
#[derive(Debug, thiserror::Error)]
pub enum LocalStateError {
    #[error("settings storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("settings rejected: {0}")]
    Settings(#[from] SettingsError),
    #[error("{domain} entry {id:?} not found")]
    NotFound { domain: Domain, id: String },
    #[error("invalid {domain} request: {reason}")]
    Invalid { domain: Domain, reason: String },
}

/// Error returned by every facade operation.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("remote failure: {0}")]
    Remote(#[from] RemoteError),
    #[error("local state failure: {0}")]
    LocalState(#[from] LocalStateError),
}

/// Coarse classification of a [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RemoteFailure,
    LocalStateFailure,
}

impl ErrorKind {
    /// Stable name for logs and metrics labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RemoteFailure => "remote_failure",
            ErrorKind::LocalStateFailure => "local_state_failure",
        }
    }
}

impl DataError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Remote(_) => ErrorKind::RemoteFailure,
            DataError::LocalState(_) => ErrorKind::LocalStateFailure,
        }
    }

    /// Whether reissuing the same call may succeed.
    ///
    /// Only transport-level remote failures qualify; rejections, missing
    /// entries and invalid local state will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Remote(RemoteError::Unreachable { .. }))
            || matches!(
                self,
                DataError::Remote(RemoteError::Rejected { status, .. }) if *status >= 500
            )
    }

    /// Whether the addressed entry does not exist, on either path.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::Remote(RemoteError::NotFound { .. })
                | DataError::LocalState(LocalStateError::NotFound { .. })
        )
    }
}
