use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the resolver reaches the operating system's resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMode {
    /// Host logic runs inside this process.
    #[default]
    InProcess,
    /// Spawn `host_command native-host` and talk native-messaging frames over stdio.
    Process,
    /// No native bridge; lookups go straight to DNS-over-HTTPS.
    Disabled,
}

impl fmt::Display for NativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NativeMode::InProcess => "in_process",
            NativeMode::Process => "process",
            NativeMode::Disabled => "disabled",
        })
    }
}

impl FromStr for NativeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_process" => Ok(NativeMode::InProcess),
            "process" => Ok(NativeMode::Process),
            "disabled" => Ok(NativeMode::Disabled),
            other => Err(format!("unknown native mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NativeConfig {
    #[serde(default)]
    pub mode: NativeMode,

    #[serde(default = "default_host_command")]
    pub host_command: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            mode: NativeMode::default(),
            host_command: default_host_command(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_host_command() -> String {
    "ipmon".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}
