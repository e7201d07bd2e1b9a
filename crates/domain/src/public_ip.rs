use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Addresses pulled out of a batch of ICE candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedAddresses {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub local: Vec<String>,
}

/// One detection report as sent by the page-side detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpReport {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    #[serde(default)]
    pub local: Vec<String>,
    #[serde(default)]
    pub has_ipv6_connectivity: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl PublicIpReport {
    pub fn new(
        detected: DetectedAddresses,
        has_ipv6_connectivity: bool,
        url: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ipv4: detected.ipv4,
            ipv6: detected.ipv6,
            local: detected.local,
            has_ipv6_connectivity,
            url,
            timestamp,
        }
    }
}

/// Process-wide record of the user's own public addresses.
/// Each new report replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublicIp {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub has_ipv6_connectivity: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl From<PublicIpReport> for UserPublicIp {
    fn from(report: PublicIpReport) -> Self {
        Self {
            ipv4: report.ipv4,
            ipv6: report.ipv6,
            has_ipv6_connectivity: report.has_ipv6_connectivity,
            timestamp: report.timestamp,
        }
    }
}
