use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Persisted tab snapshots older than this are dropped on load.
    #[serde(default = "default_snapshot_max_age_secs")]
    pub snapshot_max_age_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            settings_path: default_settings_path(),
            snapshot_max_age_secs: default_snapshot_max_age_secs(),
        }
    }
}

fn default_snapshot_path() -> String {
    "ipmon-tabs.json".to_string()
}

fn default_settings_path() -> String {
    "ipmon-settings.toml".to_string()
}

fn default_snapshot_max_age_secs() -> u64 {
    1800
}
