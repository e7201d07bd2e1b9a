pub mod doh;
pub mod errors;
pub mod logging;
pub mod native;
pub mod resolver;
pub mod root;
pub mod storage;
pub mod webrtc;

pub use doh::DohConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use native::{NativeConfig, NativeMode};
pub use resolver::ResolverConfig;
pub use root::{CliOverrides, Config, MAX_CACHE_TTL_SECS};
pub use storage::StorageConfig;
pub use webrtc::WebRtcConfig;
