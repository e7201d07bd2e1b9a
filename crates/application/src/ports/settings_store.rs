use async_trait::async_trait;
use ipmon_domain::{DomainError, Settings};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, DomainError>;
    async fn save(&self, settings: &Settings) -> Result<(), DomainError>;
}
