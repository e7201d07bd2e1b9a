use async_trait::async_trait;
use ipmon_application::ports::SnapshotStore;
use ipmon_domain::{DomainError, TabSnapshots};
use std::path::PathBuf;
use tracing::debug;

/// Tab snapshots as one JSON document; writes go through a temporary file
/// and a rename.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> Result<TabSnapshots, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TabSnapshots::new()),
            Err(e) => {
                return Err(DomainError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::Serialization(format!("Corrupt snapshot {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, snapshots: &TabSnapshots) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(snapshots)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            DomainError::Persistence(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            DomainError::Persistence(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), tabs = snapshots.len(), "Snapshots saved");
        Ok(())
    }
}
