use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DohConfig {
    /// JSON API endpoint; queried as `{endpoint}?name=<domain>&type=A|AAAA`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DohConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://dns.google/resolve".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}
