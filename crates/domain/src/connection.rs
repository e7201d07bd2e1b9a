use crate::resolution::ResolutionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Browser tab identifier. Negative ids belong to background requests.
pub type TabId = i64;

/// Browser resource type of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    Xmlhttprequest,
    Ping,
    Media,
    Websocket,
    #[serde(other)]
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::MainFrame => "main_frame",
            RequestType::SubFrame => "sub_frame",
            RequestType::Stylesheet => "stylesheet",
            RequestType::Script => "script",
            RequestType::Image => "image",
            RequestType::Font => "font",
            RequestType::Object => "object",
            RequestType::Xmlhttprequest => "xmlhttprequest",
            RequestType::Ping => "ping",
            RequestType::Media => "media",
            RequestType::Websocket => "websocket",
            RequestType::Other => "other",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "main_frame" => RequestType::MainFrame,
            "sub_frame" => RequestType::SubFrame,
            "stylesheet" => RequestType::Stylesheet,
            "script" => RequestType::Script,
            "image" => RequestType::Image,
            "font" => RequestType::Font,
            "object" => RequestType::Object,
            "xmlhttprequest" => RequestType::Xmlhttprequest,
            "ping" => RequestType::Ping,
            "media" => RequestType::Media,
            "websocket" => RequestType::Websocket,
            _ => RequestType::Other,
        })
    }
}

/// Tri-state IPv6 support flag: unknown until a resolution is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Ipv6Support {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

impl From<Option<bool>> for Ipv6Support {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Ipv6Support::Unknown,
            Some(true) => Ipv6Support::Supported,
            Some(false) => Ipv6Support::Unsupported,
        }
    }
}

impl From<Ipv6Support> for Option<bool> {
    fn from(value: Ipv6Support) -> Self {
        match value {
            Ipv6Support::Unknown => None,
            Ipv6Support::Supported => Some(true),
            Ipv6Support::Unsupported => Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub domain: String,
    pub protocol: String,
    pub is_secure: bool,
    pub request_count: u64,
    pub request_types: BTreeSet<RequestType>,
    #[serde(default)]
    pub ipv6_support: Ipv6Support,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionResult>,
}

impl DomainRecord {
    pub fn new(domain: impl Into<String>, protocol: impl Into<String>) -> Self {
        let protocol = protocol.into();
        Self {
            domain: domain.into(),
            is_secure: is_secure_protocol(&protocol),
            protocol,
            request_count: 0,
            request_types: BTreeSet::new(),
            ipv6_support: Ipv6Support::Unknown,
            resolution: None,
        }
    }

    pub fn record(&mut self, request_type: RequestType) {
        self.request_count += 1;
        self.request_types.insert(request_type);
    }

    /// Replaces any previous result wholesale.
    pub fn attach_resolution(&mut self, resolution: ResolutionResult) {
        self.ipv6_support = Some(resolution.supports_ipv6()).into();
        self.resolution = Some(resolution);
    }

    pub fn clear_resolution(&mut self) {
        self.resolution = None;
        self.ipv6_support = Ipv6Support::Unknown;
    }
}

fn is_secure_protocol(protocol: &str) -> bool {
    matches!(protocol, "https" | "wss")
}

fn is_insecure_protocol(protocol: &str) -> bool {
    matches!(protocol, "http" | "ws")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySummary {
    AllSecure,
    InsecureDetected,
    NoData,
}

/// Everything observed for one tab during its current navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    pub domains: BTreeMap<String, DomainRecord>,
    pub main_domain: Option<String>,
    pub url: Option<String>,
    pub last_update: DateTime<Utc>,
}

impl TabState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            domains: BTreeMap::new(),
            main_domain: None,
            url: None,
            last_update: now,
        }
    }

    pub fn record_request(
        &mut self,
        domain: &str,
        protocol: &str,
        request_type: RequestType,
    ) -> &DomainRecord {
        let record = self
            .domains
            .entry(domain.to_string())
            .or_insert_with(|| DomainRecord::new(domain, protocol));
        record.record(request_type);
        record
    }

    pub fn set_main_frame(&mut self, domain: &str, url: &str, now: DateTime<Utc>) {
        self.main_domain = Some(domain.to_string());
        self.url = Some(url.to_string());
        self.last_update = now;
    }

    pub fn total_requests(&self) -> u64 {
        self.domains.values().map(|d| d.request_count).sum()
    }

    pub fn security_summary(&self) -> SecuritySummary {
        let has_secure = self.domains.values().any(|d| is_secure_protocol(&d.protocol));
        let has_insecure = self
            .domains
            .values()
            .any(|d| is_insecure_protocol(&d.protocol));

        match (has_secure, has_insecure) {
            (_, true) => SecuritySummary::InsecureDetected,
            (true, false) => SecuritySummary::AllSecure,
            (false, false) => SecuritySummary::NoData,
        }
    }

    /// Whether the stored URL (query string dropped) is still a prefix of
    /// the tab's live URL. Missing URLs on either side count as a match.
    pub fn matches_live_url(&self, live_url: Option<&str>) -> bool {
        match (self.url.as_deref(), live_url) {
            (Some(stored), Some(live)) => {
                let prefix = stored.split('?').next().unwrap_or(stored);
                live.starts_with(prefix)
            }
            _ => true,
        }
    }

    pub fn is_older_than(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.last_update > max_age
    }
}

/// Serialized form of a [`TabState`]; domains become an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub domains: Vec<DomainRecord>,
    pub main_domain: Option<String>,
    pub url: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl From<&TabState> for TabSnapshot {
    fn from(state: &TabState) -> Self {
        Self {
            domains: state.domains.values().cloned().collect(),
            main_domain: state.main_domain.clone(),
            url: state.url.clone(),
            timestamp: state.last_update,
        }
    }
}

impl From<TabSnapshot> for TabState {
    fn from(snapshot: TabSnapshot) -> Self {
        Self {
            domains: snapshot
                .domains
                .into_iter()
                .map(|d| (d.domain.clone(), d))
                .collect(),
            main_domain: snapshot.main_domain,
            url: snapshot.url,
            last_update: snapshot.timestamp,
        }
    }
}

/// Persisted mapping from tab id to snapshot.
pub type TabSnapshots = BTreeMap<TabId, TabSnapshot>;
