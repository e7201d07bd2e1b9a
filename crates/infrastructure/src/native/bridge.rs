use super::messenger::NativeMessenger;
use async_trait::async_trait;
use ipmon_application::ports::{Clock, ResolutionSource};
use ipmon_domain::{
    DomainError, HostRequest, HostResponse, NativeInfo, NativeLookupError, ResolutionResult,
    ResolverKind,
};
use std::sync::Arc;
use tracing::debug;

/// Client side of the native resolver: sends lookups to the host and turns
/// replies into `system` results.
pub struct NativeResolverBridge {
    messenger: Option<Arc<dyn NativeMessenger>>,
    clock: Arc<dyn Clock>,
}

impl NativeResolverBridge {
    pub fn new(messenger: Arc<dyn NativeMessenger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            messenger: Some(messenger),
            clock,
        }
    }

    /// A bridge with no host behind it; every lookup reports `Ok(None)`.
    pub fn unavailable(clock: Arc<dyn Clock>) -> Self {
        Self {
            messenger: None,
            clock,
        }
    }

    pub fn is_available(&self) -> bool {
        self.messenger.is_some()
    }

    pub async fn lookup(
        &self,
        domain: &str,
    ) -> Result<Option<ResolutionResult>, NativeLookupError> {
        let Some(messenger) = &self.messenger else {
            return Ok(None);
        };

        let request = HostRequest::PerformDnsLookup {
            domain: Some(domain.to_string()),
        };

        match messenger.send(&request).await? {
            HostResponse::Lookup(response) => {
                let (ipv4, ipv6) = response.into_result()?;
                Ok(Some(ResolutionResult::resolved(
                    ResolverKind::System,
                    ipv4,
                    ipv6,
                    self.clock.now(),
                )))
            }
            HostResponse::Error(error) => Err(NativeLookupError::from_wire(
                error.error_code.unwrap_or_default(),
                Some(error.error),
            )),
            HostResponse::Info(_) => Err(NativeLookupError::Unknown),
        }
    }

    pub async fn native_info(&self) -> Result<Option<NativeInfo>, NativeLookupError> {
        let Some(messenger) = &self.messenger else {
            return Ok(None);
        };

        match messenger.send(&HostRequest::GetNativeInfo).await? {
            HostResponse::Info(info) => Ok(Some(info)),
            _ => Err(NativeLookupError::Unknown),
        }
    }
}

fn to_domain_error(domain: &str, error: NativeLookupError) -> DomainError {
    match error {
        NativeLookupError::Timeout => DomainError::ResolutionTimeout {
            domain: domain.to_string(),
        },
        NativeLookupError::SystemError(message) => DomainError::TransportUnavailable(message),
        other => DomainError::ResolutionFailed(format!("{} (code {})", other, other.code())),
    }
}

#[async_trait]
impl ResolutionSource for NativeResolverBridge {
    fn kind(&self) -> ResolverKind {
        ResolverKind::System
    }

    async fn lookup(&self, domain: &str) -> Result<ResolutionResult, DomainError> {
        match NativeResolverBridge::lookup(self, domain).await {
            Ok(Some(result)) => Ok(result),
            Ok(None) => {
                debug!(domain = %domain, "Native bridge not configured");
                Err(DomainError::TransportUnavailable(
                    "native resolver bridge not configured".to_string(),
                ))
            }
            Err(e) => Err(to_domain_error(domain, e)),
        }
    }
}
