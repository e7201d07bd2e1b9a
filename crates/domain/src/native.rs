//! Wire contract between the resolver bridge and the native host process.
//!
//! ```text
//! -> {"name":"performDNSLookup","domain":"example.com"}
//! <- {"domain":"example.com","ipv4":["93.184.216.34"],"ipv6":[],"success":true}
//! <- {"domain":"bad.invalid","ipv4":[],"ipv6":[],"error":"DNS resolution failed",
//!     "errorCode":2,"systemMessage":"nodename nor servname provided"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the native host. Codes are part of the wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeLookupError {
    #[error("unknown native lookup error")]
    Unknown,

    #[error("no domain supplied")]
    InvalidDomain,

    #[error("DNS resolution failed: {system_message}")]
    DnsResolutionFailed { system_message: String },

    #[error("DNS lookup timed out")]
    Timeout,

    #[error("system error: {0}")]
    SystemError(String),
}

impl NativeLookupError {
    pub fn code(&self) -> i32 {
        match self {
            NativeLookupError::Unknown => 0,
            NativeLookupError::InvalidDomain => 1,
            NativeLookupError::DnsResolutionFailed { .. } => 2,
            NativeLookupError::Timeout => 3,
            NativeLookupError::SystemError(_) => 4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NativeLookupError::Unknown => "Unknown error",
            NativeLookupError::InvalidDomain => "Domain not specified",
            NativeLookupError::DnsResolutionFailed { .. } => "DNS resolution failed",
            NativeLookupError::Timeout => "Lookup timed out",
            NativeLookupError::SystemError(_) => "System error",
        }
    }

    pub fn system_message(&self) -> &str {
        match self {
            NativeLookupError::DnsResolutionFailed { system_message } => system_message,
            NativeLookupError::SystemError(message) => message,
            _ => "",
        }
    }

    pub fn from_wire(code: i32, system_message: Option<String>) -> Self {
        let system_message = system_message.unwrap_or_default();
        match code {
            1 => NativeLookupError::InvalidDomain,
            2 => NativeLookupError::DnsResolutionFailed { system_message },
            3 => NativeLookupError::Timeout,
            4 => NativeLookupError::SystemError(system_message),
            _ => NativeLookupError::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum HostRequest {
    #[serde(rename = "performDNSLookup")]
    PerformDnsLookup {
        #[serde(default)]
        domain: Option<String>,
    },
    #[serde(rename = "getNativeInfo")]
    GetNativeInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeLookupResponse {
    pub domain: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

impl NativeLookupResponse {
    pub fn success(domain: impl Into<String>, ipv4: Vec<String>, ipv6: Vec<String>) -> Self {
        Self {
            domain: domain.into(),
            ipv4,
            ipv6,
            success: Some(true),
            error: None,
            error_code: None,
            system_message: None,
        }
    }

    pub fn failure(domain: impl Into<String>, error: &NativeLookupError) -> Self {
        Self {
            domain: domain.into(),
            ipv4: Vec::new(),
            ipv6: Vec::new(),
            success: None,
            error: Some(error.description().to_string()),
            error_code: Some(error.code()),
            system_message: Some(error.system_message().to_string()),
        }
    }

    pub fn into_result(self) -> Result<(Vec<String>, Vec<String>), NativeLookupError> {
        match self.error {
            None => Ok((self.ipv4, self.ipv6)),
            Some(_) => Err(NativeLookupError::from_wire(
                self.error_code.unwrap_or_default(),
                self.system_message,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCapabilities {
    pub dns_lookup: bool,
    pub network_monitoring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeInfo {
    pub version: String,
    pub platform: String,
    pub capabilities: NativeCapabilities,
}

/// Reply to a request the host could not route (missing domain, unknown name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
}

impl HostErrorResponse {
    pub fn unknown_message() -> Self {
        Self {
            error: "Unknown message type".to_string(),
            error_code: None,
        }
    }
}

impl From<&NativeLookupError> for HostErrorResponse {
    fn from(error: &NativeLookupError) -> Self {
        Self {
            error: error.description().to_string(),
            error_code: Some(error.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostResponse {
    Lookup(NativeLookupResponse),
    Info(NativeInfo),
    Error(HostErrorResponse),
}
