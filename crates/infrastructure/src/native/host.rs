use super::codec::{read_frame, write_message, FrameError};
use ipmon_domain::{
    HostErrorResponse, HostRequest, HostResponse, NativeCapabilities, NativeInfo,
    NativeLookupError, NativeLookupResponse,
};
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Answers native messaging requests using the operating system resolver.
#[derive(Debug, Clone)]
pub struct NativeHost {
    timeout: Duration,
}

impl NativeHost {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn info() -> NativeInfo {
        NativeInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            capabilities: NativeCapabilities {
                dns_lookup: true,
                network_monitoring: false,
            },
        }
    }

    pub async fn handle(&self, request: HostRequest) -> HostResponse {
        match request {
            HostRequest::GetNativeInfo => HostResponse::Info(Self::info()),
            HostRequest::PerformDnsLookup { domain } => {
                let Some(domain) = domain.filter(|d| !d.trim().is_empty()) else {
                    return HostResponse::Error(HostErrorResponse::from(
                        &NativeLookupError::InvalidDomain,
                    ));
                };

                match self.lookup(&domain).await {
                    Ok((ipv4, ipv6)) => {
                        HostResponse::Lookup(NativeLookupResponse::success(domain, ipv4, ipv6))
                    }
                    Err(e) => {
                        debug!(error = %e, domain = %domain, "Native lookup failed");
                        HostResponse::Lookup(NativeLookupResponse::failure(domain, &e))
                    }
                }
            }
        }
    }

    /// Handles a raw JSON message; anything that is not a known request gets
    /// the "Unknown message type" reply.
    pub async fn handle_json(&self, payload: &[u8]) -> HostResponse {
        match serde_json::from_slice::<HostRequest>(payload) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Unrecognised native message");
                HostResponse::Error(HostErrorResponse::unknown_message())
            }
        }
    }

    /// Family-agnostic lookup. Addresses are deduplicated, first-seen order kept.
    pub async fn lookup(
        &self,
        domain: &str,
    ) -> Result<(Vec<String>, Vec<String>), NativeLookupError> {
        let addrs = tokio::time::timeout(self.timeout, tokio::net::lookup_host((domain, 0)))
            .await
            .map_err(|_| NativeLookupError::Timeout)?
            .map_err(|e| NativeLookupError::DnsResolutionFailed {
                system_message: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        let mut ipv4 = Vec::new();
        let mut ipv6 = Vec::new();

        for addr in addrs {
            let ip = addr.ip();
            if !seen.insert(ip) {
                continue;
            }
            match ip {
                IpAddr::V4(v4) => ipv4.push(v4.to_string()),
                IpAddr::V6(v6) => ipv6.push(v6.to_string()),
            }
        }

        Ok((ipv4, ipv6))
    }

    /// Serves frames until the peer closes the stream.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), FrameError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Native host ready");
        while let Some(payload) = read_frame(&mut reader).await? {
            let response = self.handle_json(&payload).await;
            write_message(&mut writer, &response).await?;
        }
        info!("Native host input closed");
        Ok(())
    }
}
