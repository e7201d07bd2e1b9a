use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which source produced a [`ResolutionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    System,
    Doh,
    Local,
    Unknown,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverKind::System => "system",
            ResolverKind::Doh => "doh",
            ResolverKind::Local => "local",
            ResolverKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate addresses backing one domain.
///
/// Never mutated after construction. A local result always has empty
/// address lists and `resolver == Local`; the constructors are the only
/// way to build one, so the invariant cannot be broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ResolutionResultRepr")]
pub struct ResolutionResult {
    ipv4: Vec<String>,
    ipv6: Vec<String>,
    is_local: bool,
    resolver: ResolverKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl ResolutionResult {
    pub fn resolved(
        resolver: ResolverKind,
        ipv4: Vec<String>,
        ipv6: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        if resolver == ResolverKind::Local {
            return Self::local(timestamp);
        }
        Self {
            ipv4,
            ipv6,
            is_local: false,
            resolver,
            timestamp,
        }
    }

    pub fn local(timestamp: DateTime<Utc>) -> Self {
        Self {
            ipv4: Vec::new(),
            ipv6: Vec::new(),
            is_local: true,
            resolver: ResolverKind::Local,
            timestamp,
        }
    }

    pub fn unknown(timestamp: DateTime<Utc>) -> Self {
        Self {
            ipv4: Vec::new(),
            ipv6: Vec::new(),
            is_local: false,
            resolver: ResolverKind::Unknown,
            timestamp,
        }
    }

    pub fn ipv4(&self) -> &[String] {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &[String] {
        &self.ipv6
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn resolver(&self) -> ResolverKind {
        self.resolver
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn has_addresses(&self) -> bool {
        !self.ipv4.is_empty() || !self.ipv6.is_empty()
    }

    pub fn supports_ipv6(&self) -> bool {
        !self.ipv6.is_empty()
    }

    pub fn display_state(&self) -> IpDisplayState {
        IpDisplayState::from_resolution(Some(self))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionResultRepr {
    #[serde(default)]
    ipv4: Vec<String>,
    #[serde(default)]
    ipv6: Vec<String>,
    #[serde(default)]
    is_local: bool,
    resolver: ResolverKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl From<ResolutionResultRepr> for ResolutionResult {
    fn from(repr: ResolutionResultRepr) -> Self {
        if repr.is_local || repr.resolver == ResolverKind::Local {
            return Self::local(repr.timestamp);
        }
        Self::resolved(repr.resolver, repr.ipv4, repr.ipv6, repr.timestamp)
    }
}

/// Per-call policy for the resolver pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOptions {
    pub exclude_local_domains: bool,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            exclude_local_domains: true,
        }
    }
}

/// What a presentation layer should show for a domain's addresses.
///
/// `Loading`, `Local` and `Unknown` are deliberately separate variants:
/// "not asked yet", "never leaves the machine" and "every source failed"
/// must render differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum IpDisplayState {
    Loading,
    Local,
    Unknown,
    Resolved { ipv4: Vec<String>, ipv6: Vec<String> },
}

impl IpDisplayState {
    pub fn from_resolution(resolution: Option<&ResolutionResult>) -> Self {
        match resolution {
            None => IpDisplayState::Loading,
            Some(r) if r.is_local() => IpDisplayState::Local,
            Some(r) if !r.has_addresses() => IpDisplayState::Unknown,
            Some(r) => IpDisplayState::Resolved {
                ipv4: r.ipv4().to_vec(),
                ipv6: r.ipv6().to_vec(),
            },
        }
    }
}

impl fmt::Display for IpDisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpDisplayState::Loading => f.write_str("loading"),
            IpDisplayState::Local => f.write_str("local domain"),
            IpDisplayState::Unknown => f.write_str("unknown"),
            IpDisplayState::Resolved { ipv4, ipv6 } => {
                let mut sections = Vec::with_capacity(2);
                if !ipv4.is_empty() {
                    sections.push(format!("IPv4: {}", ipv4.join(", ")));
                }
                if !ipv6.is_empty() {
                    sections.push(format!("IPv6: {}", ipv6.join(", ")));
                }
                f.write_str(&sections.join(" | "))
            }
        }
    }
}
