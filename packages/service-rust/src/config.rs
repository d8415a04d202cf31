//! Configuration for the data layer.

use std::path::PathBuf;
use std::time::Duration;

use backoffice_core::Mode;

/// Top-level data layer configuration.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Prefix for every persisted key (`<namespace>:settings`, `<namespace>:mode`).
    pub namespace: String,
    /// Mode reported before any override or probe answer.
    pub initial_mode: Mode,
    /// Environment variable probed for the mode. `None` disables probing.
    pub mode_env_var: Option<String>,
    /// Upper bound on a single probe call.
    pub probe_timeout: Duration,
    /// Whether administrative mode overrides survive restarts.
    pub persist_mode_override: bool,
    /// Directory for the file-backed key-value store. `None` keeps state in memory.
    pub state_dir: Option<PathBuf>,
    pub mock: MockConfig,
    pub backend: BackendConfig,
}

impl DataConfig {
    /// Key holding the persisted settings record.
    #[must_use]
    pub fn settings_key(&self) -> String {
        format!("{}:settings", self.namespace)
    }

    /// Key holding the persisted mode override.
    #[must_use]
    pub fn mode_key(&self) -> String {
        format!("{}:mode", self.namespace)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            namespace: "backoffice".to_string(),
            initial_mode: Mode::Mock,
            mode_env_var: Some("BACKOFFICE_MOCK_MODE".to_string()),
            probe_timeout: Duration::from_secs(2),
            persist_mode_override: true,
            state_dir: None,
            mock: MockConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

/// Shape of the simulated collections.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Seed for the generator. Same seed and clock anchor, same collections.
    pub seed: u64,
    pub product_count: usize,
    pub sale_count: usize,
    pub archived_count: usize,
    /// How far back generated sales reach.
    pub history_days: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            product_count: 24,
            sale_count: 120,
            archived_count: 4,
            history_days: 7,
        }
    }
}

/// Live backend connection settings.
///
/// No base URL means no live backend; live-mode calls then fail as remote failures.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}
