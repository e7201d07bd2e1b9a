use async_trait::async_trait;
use ipmon_application::ports::{SettingsStore, SnapshotStore};
use ipmon_domain::{DomainError, Settings, TabSnapshots};
use tokio::sync::RwLock;

/// Settings that live only as long as the process.
#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<Settings>,
}

impl InMemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<Settings, DomainError> {
        Ok(*self.settings.read().await)
    }

    async fn save(&self, settings: &Settings) -> Result<(), DomainError> {
        *self.settings.write().await = *settings;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<TabSnapshots>,
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<TabSnapshots, DomainError> {
        Ok(self.snapshots.read().await.clone())
    }

    async fn save(&self, snapshots: &TabSnapshots) -> Result<(), DomainError> {
        *self.snapshots.write().await = snapshots.clone();
        Ok(())
    }
}
