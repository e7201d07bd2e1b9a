use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebRtcConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_ipv6_probe_url")]
    pub ipv6_probe_url: String,

    #[serde(default = "default_ipv6_probe_timeout_ms")]
    pub ipv6_probe_timeout_ms: u64,
}

impl Default for WebRtcConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            ipv6_probe_url: default_ipv6_probe_url(),
            ipv6_probe_timeout_ms: default_ipv6_probe_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_ipv6_probe_url() -> String {
    "https://ipv6.google.com/".to_string()
}

fn default_ipv6_probe_timeout_ms() -> u64 {
    2000
}
