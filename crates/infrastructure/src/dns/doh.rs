//! DNS-over-HTTPS fallback using the JSON API (`application/dns-json`).
//!
//! ```text
//! GET /resolve?name=example.com&type=A HTTP/2
//! Accept: application/dns-json
//!
//! {"Status":0,"Answer":[{"name":"example.com.","type":1,"TTL":300,"data":"93.184.216.34"}]}
//! ```

use async_trait::async_trait;
use ipmon_application::ports::{Clock, ResolutionSource};
use ipmon_domain::{DomainError, RecordType, ResolutionResult, ResolverKind};
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client with connection pooling.
pub(crate) static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DohAnswer {
    #[serde(rename = "type")]
    pub record_type: u16,
    pub data: String,
}

impl DohResponse {
    /// Data of the answers matching `record_type`; CNAMEs and the like are skipped.
    pub fn addresses(self, record_type: RecordType) -> Vec<String> {
        self.answer
            .into_iter()
            .filter(|a| a.record_type == record_type.code())
            .map(|a| a.data)
            .collect()
    }
}

#[async_trait]
pub trait DohTransport: Send + Sync {
    async fn query(&self, domain: &str, record_type: RecordType)
        -> Result<DohResponse, DomainError>;
}

pub struct HttpsJsonTransport {
    endpoint: String,
    timeout: Duration,
}

impl HttpsJsonTransport {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }
}

#[async_trait]
impl DohTransport for HttpsJsonTransport {
    async fn query(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<DohResponse, DomainError> {
        debug!(endpoint = %self.endpoint, domain = %domain, record_type = %record_type, "Sending DoH query");

        let response = tokio::time::timeout(
            self.timeout,
            SHARED_CLIENT
                .get(&self.endpoint)
                .query(&[("name", domain), ("type", record_type.as_str())])
                .header(reqwest::header::ACCEPT, DNS_JSON_CONTENT_TYPE)
                .send(),
        )
        .await
        .map_err(|_| DomainError::ResolutionTimeout {
            domain: domain.to_string(),
        })?
        .map_err(|e| {
            DomainError::NetworkUnavailable(format!(
                "DoH request to {} failed: {}",
                self.endpoint, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::ResolutionFailed(format!(
                "DoH server {} returned HTTP {}",
                self.endpoint,
                status.as_u16()
            )));
        }

        tokio::time::timeout(self.timeout, response.json::<DohResponse>())
            .await
            .map_err(|_| DomainError::ResolutionTimeout {
                domain: domain.to_string(),
            })?
            .map_err(|e| DomainError::Serialization(format!("Invalid DoH response: {}", e)))
    }
}

/// Queries A and AAAA in parallel; each family fails independently.
pub struct DohResolver {
    transport: Arc<dyn DohTransport>,
    clock: Arc<dyn Clock>,
}

impl DohResolver {
    pub fn new(transport: Arc<dyn DohTransport>, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    async fn query_family(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        self.transport
            .query(domain, record_type)
            .await
            .map(|response| response.addresses(record_type))
    }
}

#[async_trait]
impl ResolutionSource for DohResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Doh
    }

    fn accepts_local_domains(&self) -> bool {
        false
    }

    async fn lookup(&self, domain: &str) -> Result<ResolutionResult, DomainError> {
        let (ipv4, ipv6) = tokio::join!(
            self.query_family(domain, RecordType::A),
            self.query_family(domain, RecordType::AAAA)
        );

        let (ipv4, ipv6) = match (ipv4, ipv6) {
            (Err(a), Err(aaaa)) => {
                return Err(DomainError::NetworkUnavailable(format!(
                    "A: {}; AAAA: {}",
                    a, aaaa
                )));
            }
            (ipv4, ipv6) => (
                ipv4.unwrap_or_else(|e| {
                    debug!(error = %e, domain = %domain, "DoH A query failed");
                    Vec::new()
                }),
                ipv6.unwrap_or_else(|e| {
                    debug!(error = %e, domain = %domain, "DoH AAAA query failed");
                    Vec::new()
                }),
            ),
        };

        Ok(ResolutionResult::resolved(
            ResolverKind::Doh,
            ipv4,
            ipv6,
            self.clock.now(),
        ))
    }
}
