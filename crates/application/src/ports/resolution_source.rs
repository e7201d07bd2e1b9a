use async_trait::async_trait;
use ipmon_domain::{DomainError, ResolutionResult, ResolverKind};

/// One stage of the resolver pipeline.
#[async_trait]
pub trait ResolutionSource: Send + Sync {
    fn kind(&self) -> ResolverKind;

    /// Sources that leave the machine return `false`; local names stop
    /// before reaching them.
    fn accepts_local_domains(&self) -> bool {
        true
    }

    async fn lookup(&self, domain: &str) -> Result<ResolutionResult, DomainError>;
}
