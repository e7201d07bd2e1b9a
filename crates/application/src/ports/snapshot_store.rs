use async_trait::async_trait;
use ipmon_domain::{DomainError, TabSnapshots};

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns an empty map when nothing has been persisted yet.
    async fn load(&self) -> Result<TabSnapshots, DomainError>;
    async fn save(&self, snapshots: &TabSnapshots) -> Result<(), DomainError>;
}
