use async_trait::async_trait;
use ipmon_application::ports::ConnectivityProbe;
use std::time::Duration;
use tracing::debug;

use crate::dns::doh::SHARED_CLIENT;

/// Reports IPv6 connectivity when an IPv6-only URL answers at all.
/// The status code and body are ignored.
pub struct HttpsConnectivityProbe {
    url: String,
    timeout: Duration,
}

impl HttpsConnectivityProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpsConnectivityProbe {
    async fn has_ipv6_connectivity(&self) -> bool {
        let request = SHARED_CLIENT.get(&self.url).send();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                debug!(url = %self.url, status = %response.status(), "IPv6 probe answered");
                true
            }
            Ok(Err(e)) => {
                debug!(url = %self.url, error = %e, "IPv6 probe failed");
                false
            }
            Err(_) => {
                debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "IPv6 probe timed out");
                false
            }
        }
    }
}
