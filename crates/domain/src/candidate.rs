//! ICE candidate parsing and the public-address collector state machine.
//!
//! A candidate line looks like
//! `candidate:842163049 1 udp 1677729535 203.0.113.7 54321 typ srflx ...`;
//! the transport address is the fifth whitespace-separated field.

use crate::address_filter::AddressClassifier;
use crate::public_ip::DetectedAddresses;

const ADDRESS_FIELD: usize = 4;

/// Extracts the transport address, or `None` when the line is too short
/// to carry both an address and a port.
pub fn candidate_address(candidate: &str) -> Option<&str> {
    let mut fields = candidate.split_whitespace();
    let address = fields.nth(ADDRESS_FIELD)?;
    let _port = fields.next()?;
    Some(address)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Collecting,
    /// Both a public IPv4 and a public IPv6 were found.
    Complete,
    TimedOut,
    /// Terminal: the result has been handed out.
    Done,
}

/// How a single candidate address was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateClass {
    PublicV4(String),
    PublicV6(String),
    Local(String),
    Ignored,
}

pub fn classify_candidate(candidate: &str) -> CandidateClass {
    let Some(address) = candidate_address(candidate) else {
        return CandidateClass::Ignored;
    };

    if address.contains('.') {
        // Obfuscated mDNS names (`<uuid>.local`) are not addresses at all.
        if !AddressClassifier::is_valid_ipv4(address) {
            return CandidateClass::Ignored;
        }
        if AddressClassifier::is_private_ipv4(address) {
            return CandidateClass::Local(address.to_string());
        }
        return CandidateClass::PublicV4(address.to_string());
    }

    if address.contains(':') {
        let normalized = AddressClassifier::normalize_ipv6(address);
        if AddressClassifier::is_private_ipv6(&normalized) {
            return CandidateClass::Local(normalized);
        }
        return CandidateClass::PublicV6(normalized);
    }

    CandidateClass::Ignored
}

/// Accumulates candidates until both public families are known or the
/// caller declares a timeout. The first public address of each family wins.
#[derive(Debug)]
pub struct CandidateCollector {
    state: CollectorState,
    found: DetectedAddresses,
}

impl CandidateCollector {
    pub fn new() -> Self {
        Self {
            state: CollectorState::Collecting,
            found: DetectedAddresses::default(),
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn found(&self) -> &DetectedAddresses {
        &self.found
    }

    /// Feeds one candidate line. Ignored once the collector left `Collecting`.
    pub fn offer(&mut self, candidate: &str) -> CollectorState {
        if self.state != CollectorState::Collecting {
            return self.state;
        }

        match classify_candidate(candidate) {
            CandidateClass::PublicV4(addr) => {
                self.found.ipv4.get_or_insert(addr);
            }
            CandidateClass::PublicV6(addr) => {
                self.found.ipv6.get_or_insert(addr);
            }
            CandidateClass::Local(addr) => {
                if !self.found.local.contains(&addr) {
                    self.found.local.push(addr);
                }
            }
            CandidateClass::Ignored => {}
        }

        if self.found.ipv4.is_some() && self.found.ipv6.is_some() {
            self.state = CollectorState::Complete;
        }
        self.state
    }

    pub fn time_out(&mut self) -> CollectorState {
        if self.state == CollectorState::Collecting {
            self.state = CollectorState::TimedOut;
        }
        self.state
    }

    /// Moves to `Done` and hands out what was collected. Returns `None` if
    /// the result was already taken.
    pub fn finish(&mut self) -> Option<DetectedAddresses> {
        match self.state {
            CollectorState::Done => None,
            CollectorState::Collecting => {
                self.time_out();
                self.finish()
            }
            CollectorState::Complete | CollectorState::TimedOut => {
                self.state = CollectorState::Done;
                Some(std::mem::take(&mut self.found))
            }
        }
    }
}

impl Default for CandidateCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_address_requires_port_field() {
        assert_eq!(
            candidate_address("candidate:1 1 udp 2122260223 192.168.1.5 54400 typ host"),
            Some("192.168.1.5")
        );
        assert_eq!(candidate_address("candidate:1 1 udp 2122260223 192.168.1.5"), None);
        assert_eq!(candidate_address(""), None);
    }

    #[test]
    fn test_mdns_candidate_ignored() {
        let line = "candidate:1 1 udp 2122260223 4b1e2f0c-5d3a-4b6e-9f21-3c6d.local 54400 typ host";
        assert_eq!(classify_candidate(line), CandidateClass::Ignored);
    }

    #[test]
    fn test_finish_twice_yields_once() {
        let mut collector = CandidateCollector::new();
        collector.time_out();
        assert!(collector.finish().is_some());
        assert!(collector.finish().is_none());
        assert_eq!(collector.state(), CollectorState::Done);
    }
}
