mod clock;
mod peer_connection;
mod resolution_cache_port;
mod resolution_source;
mod settings_store;
mod snapshot_store;

pub use clock::Clock;
pub use peer_connection::{ConnectivityProbe, PeerConnection};
pub use resolution_cache_port::ResolutionCachePort;
pub use resolution_source::ResolutionSource;
pub use settings_store::SettingsStore;
pub use snapshot_store::SnapshotStore;
