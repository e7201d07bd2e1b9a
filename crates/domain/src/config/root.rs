use serde::{Deserialize, Serialize};

use super::doh::DohConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::native::{NativeConfig, NativeMode};
use super::resolver::ResolverConfig;
use super::storage::StorageConfig;
use super::webrtc::WebRtcConfig;

const LOCAL_CONFIG_PATH: &str = "ipmon.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ipmon/config.toml";

/// Upper bound for `resolver.cache_ttl_secs` (one day).
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Main configuration structure for ipmon
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Resolution cache and pipeline behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Native (operating system) resolver bridge
    #[serde(default)]
    pub native: NativeConfig,

    /// DNS-over-HTTPS fallback
    #[serde(default)]
    pub doh: DohConfig,

    /// Public address detection
    #[serde(default)]
    pub webrtc: WebRtcConfig,

    /// Snapshot and settings persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ipmon.toml in current directory
    /// 3. /etc/ipmon/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(path) = overrides.snapshot_path {
            self.storage.snapshot_path = path;
        }
        if let Some(endpoint) = overrides.doh_endpoint {
            self.doh.endpoint = endpoint;
        }
        if let Some(mode) = overrides.native_mode {
            self.native.mode = mode;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.cache_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "resolver.cache_ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.resolver.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Validation(format!(
                "resolver.cache_ttl_secs must be at most {}",
                MAX_CACHE_TTL_SECS
            )));
        }

        if self.resolver.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "resolver.cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.native.timeout_ms == 0 || self.doh.timeout_ms == 0 || self.webrtc.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        if self.native.mode == NativeMode::Process && self.native.host_command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "native.host_command is required when native.mode = \"process\"".to_string(),
            ));
        }

        if !self.doh.endpoint.starts_with("https://") && !self.doh.endpoint.starts_with("http://") {
            return Err(ConfigError::Validation(format!(
                "doh.endpoint must be an http(s) URL: {}",
                self.doh.endpoint
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub snapshot_path: Option<String>,
    pub doh_endpoint: Option<String>,
    pub native_mode: Option<NativeMode>,
}
