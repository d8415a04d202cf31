//! Mock/live mode resolution.
//!
//! - [`ModeStore`]: the process-wide flag every facade consults once per call
//! - [`ModeProbe`]: pluggable external signal (environment, remote flag)

mod probe;
mod store;

pub use probe::{EnvModeProbe, ModeProbe, ProbeError};
pub use store::{ModeSource, ModeState, ModeStore};
