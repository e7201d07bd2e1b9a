use std::net::Ipv6Addr;

const PRIVATE_IPV4_RANGES: &[(u8, u8, u8, u8, u8)] = &[
    (10, 0, 0, 0, 8),
    (127, 0, 0, 0, 8),
    (0, 0, 0, 0, 8),
    (169, 254, 0, 0, 16),
    (192, 168, 0, 0, 16),
    (172, 16, 0, 0, 12),
    (100, 64, 0, 0, 10),
];

const PRIVATE_IPV6_PREFIXES: &[&str] = &[
    "fe80:",    // link-local
    "fc",       // unique local (fc00::/7)
    "fd",       // unique local (fc00::/7)
    "2001:db8", // documentation
];

const LOCAL_TLDS: &[&str] = &[".local", ".home", ".lan", ".internal", ".lab"];

const LOOPBACK_NAMES: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Conservative classification of addresses and host names.
///
/// Anything that cannot be parsed is reported as private.
pub struct AddressClassifier;

impl AddressClassifier {
    /// Parses a strict dotted-quad: four decimal octets of 1–3 digits, each <= 255.
    pub fn parse_ipv4_octets(addr: &str) -> Option<[u8; 4]> {
        let mut octets = [0u8; 4];
        let mut parts = addr.split('.');

        for slot in octets.iter_mut() {
            let part = parts.next()?;
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let value: u16 = part.parse().ok()?;
            *slot = u8::try_from(value).ok()?;
        }

        if parts.next().is_some() {
            return None;
        }

        Some(octets)
    }

    pub fn is_valid_ipv4(addr: &str) -> bool {
        Self::parse_ipv4_octets(addr).is_some()
    }

    pub fn is_private_ipv4(addr: &str) -> bool {
        match Self::parse_ipv4_octets(addr) {
            Some(octets) => PRIVATE_IPV4_RANGES
                .iter()
                .any(|(a, b, c, d, mask)| {
                    Self::matches_ipv4_range(octets, (*a, *b, *c, *d), *mask)
                }),
            None => true,
        }
    }

    /// Drops a `%zone` suffix and lower-cases the rest.
    pub fn normalize_ipv6(addr: &str) -> String {
        addr.split_once('%')
            .map_or(addr, |(head, _)| head)
            .to_ascii_lowercase()
    }

    fn is_ipv6_syntax(normalized: &str) -> bool {
        normalized.contains(':') && normalized.chars().all(|c| c == ':' || c.is_ascii_hexdigit())
    }

    pub fn is_private_ipv6(addr: &str) -> bool {
        let normalized = Self::normalize_ipv6(addr);

        if !Self::is_ipv6_syntax(&normalized) {
            return true;
        }

        if normalized == "::1" {
            return true;
        }

        if PRIVATE_IPV6_PREFIXES
            .iter()
            .any(|prefix| normalized.starts_with(prefix))
        {
            return true;
        }

        // Expanded spellings of loopback/unspecified slip past the prefix table.
        match normalized.parse::<Ipv6Addr>() {
            Ok(ip) => ip.is_loopback() || ip.is_unspecified(),
            Err(_) => true,
        }
    }

    /// Whether resolving `domain` must stay on the local machine.
    pub fn is_local_domain_name(domain: &str) -> bool {
        let name = domain.trim().trim_end_matches('.').to_ascii_lowercase();
        if name.is_empty() {
            return false;
        }

        if LOOPBACK_NAMES.contains(&name.as_str()) {
            return true;
        }

        if LOCAL_TLDS.iter().any(|tld| name.ends_with(tld)) {
            return true;
        }

        if Self::looks_like_dotted_quad(&name) {
            return Self::is_private_ipv4(&name);
        }

        let unbracketed = name
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(&name);
        if unbracketed.contains(':') && Self::is_ipv6_literal(unbracketed) {
            return Self::is_private_ipv6(unbracketed);
        }

        false
    }

    fn looks_like_dotted_quad(name: &str) -> bool {
        let parts: Vec<&str> = name.split('.').collect();
        parts.len() == 4
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    }

    fn is_ipv6_literal(name: &str) -> bool {
        Self::normalize_ipv6(name).parse::<Ipv6Addr>().is_ok()
    }

    fn matches_ipv4_range(ip: [u8; 4], network: (u8, u8, u8, u8), mask: u8) -> bool {
        let shift = 32 - u32::from(mask);
        let ip_int = u32::from_be_bytes(ip);
        let net_int = u32::from_be_bytes([network.0, network.1, network.2, network.3]);
        (ip_int >> shift) == (net_int >> shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cgnat_boundaries() {
        assert!(AddressClassifier::is_private_ipv4("100.64.0.0"));
        assert!(AddressClassifier::is_private_ipv4("100.127.255.255"));
        assert!(!AddressClassifier::is_private_ipv4("100.63.255.255"));
        assert!(!AddressClassifier::is_private_ipv4("100.128.0.0"));
    }

    #[test]
    fn test_zone_suffix_stripped() {
        assert_eq!(AddressClassifier::normalize_ipv6("FE80::1%en0"), "fe80::1");
        assert_eq!(AddressClassifier::normalize_ipv6("2606:4700::1"), "2606:4700::1");
    }

    #[test]
    fn test_expanded_loopback_is_private() {
        assert!(AddressClassifier::is_private_ipv6("0:0:0:0:0:0:0:1"));
        assert!(AddressClassifier::is_private_ipv6("::"));
    }
}
