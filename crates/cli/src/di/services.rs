use super::ResolverServices;
use ipmon_application::ports::{Clock, SettingsStore, SnapshotStore};
use ipmon_application::services::DomainRegistry;
use ipmon_application::use_cases::{HandleMessageUseCase, PublicIpDetector};
use ipmon_domain::Config;
use ipmon_infrastructure::storage::{
    InMemorySettingsStore, InMemorySnapshotStore, JsonSnapshotStore, TomlSettingsStore,
};
use ipmon_infrastructure::system::HttpsConnectivityProbe;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct AppServices {
    pub registry: Arc<DomainRegistry>,
    pub router: Arc<HandleMessageUseCase>,
}

impl AppServices {
    /// `ephemeral` keeps snapshots and settings in memory only.
    pub fn new(config: &Config, resolver: &ResolverServices, ephemeral: bool) -> Self {
        let (snapshots, settings): (Arc<dyn SnapshotStore>, Arc<dyn SettingsStore>) = if ephemeral {
            info!("Using in-memory snapshot and settings stores");
            (
                Arc::new(InMemorySnapshotStore::default()),
                Arc::new(InMemorySettingsStore::default()),
            )
        } else {
            info!(
                snapshots = %config.storage.snapshot_path,
                settings = %config.storage.settings_path,
                "Using file-backed stores"
            );
            (
                Arc::new(JsonSnapshotStore::new(&config.storage.snapshot_path)),
                Arc::new(TomlSettingsStore::new(&config.storage.settings_path)),
            )
        };

        let max_age = i64::try_from(config.storage.snapshot_max_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX);
        let registry = Arc::new(DomainRegistry::new(
            snapshots,
            resolver.clock.clone(),
            max_age,
        ));

        let router = Arc::new(HandleMessageUseCase::new(
            registry.clone(),
            resolver.resolver.clone(),
            settings,
            resolver.clock.clone(),
        ));

        Self { registry, router }
    }
}

pub fn build_detector(config: &Config, clock: Arc<dyn Clock>) -> PublicIpDetector {
    let probe = HttpsConnectivityProbe::new(
        config.webrtc.ipv6_probe_url.clone(),
        Duration::from_millis(config.webrtc.ipv6_probe_timeout_ms),
    );
    PublicIpDetector::new(
        Arc::new(probe),
        clock,
        Duration::from_millis(config.webrtc.timeout_ms),
    )
}
