//! ipmon domain layer: entities, classification rules and wire types.
pub mod address_filter;
pub mod candidate;
pub mod config;
pub mod connection;
pub mod errors;
pub mod native;
pub mod public_ip;
pub mod record_type;
pub mod resolution;
pub mod settings;

pub use address_filter::AddressClassifier;
pub use candidate::{
    candidate_address, classify_candidate, CandidateClass, CandidateCollector, CollectorState,
};
pub use config::{CliOverrides, Config, ConfigError};
pub use connection::{
    DomainRecord, Ipv6Support, RequestType, SecuritySummary, TabId, TabSnapshot, TabSnapshots,
    TabState,
};
pub use errors::DomainError;
pub use native::{
    HostErrorResponse, HostRequest, HostResponse, NativeCapabilities, NativeInfo,
    NativeLookupError, NativeLookupResponse,
};
pub use public_ip::{DetectedAddresses, PublicIpReport, UserPublicIp};
pub use record_type::RecordType;
pub use resolution::{IpDisplayState, ResolutionOptions, ResolutionResult, ResolverKind};
pub use settings::{Settings, SettingsUpdate};
