//! Fingerprint: maps device network metadata to a deferred-match key
//!
//! The tracking server recomputes the same digest over the address and
//! user agent it observed when the ad was clicked, so both sides must hash
//! the exact same bytes:
//! - no separator between address and user agent
//! - no case folding, trimming or other normalization
//! - lowercase hex output
//!
//! Any change here breaks matching against already-recorded clicks.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a hex-encoded fingerprint (SHA-256 -> 32 bytes -> 64 chars)
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Address used when the device reports no usable network interface
pub const PLACEHOLDER_ADDRESS: &str = "0.0.0.0";

/// Interfaces consulted first, in order: primary wireless, then cellular
pub const PREFERRED_INTERFACES: [&str; 2] = ["en0", "pdp_ip0"];

/// Lowercase hex SHA-256 digest of `address ++ user_agent`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the deferred-match fingerprint.
///
/// Hashes the UTF-8 bytes of `address` immediately followed by `user_agent`.
/// Deterministic: equal inputs always produce the same 64-character digest.
pub fn compute_fingerprint(address: &str, user_agent: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(user_agent.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Pick the address string to fingerprint from `(interface, address)` pairs.
///
/// Addresses of [`PREFERRED_INTERFACES`] are concatenated in preference
/// order. If none of those are present, every other address is used in
/// interface-name order. With no addresses at all, [`PLACEHOLDER_ADDRESS`]
/// is returned so attribution can still proceed.
pub fn select_address(interfaces: &[(String, String)]) -> String {
    let preferred: String = PREFERRED_INTERFACES
        .iter()
        .flat_map(|name| {
            interfaces
                .iter()
                .filter(move |(iface, _)| iface == name)
                .map(|(_, addr)| addr.as_str())
        })
        .collect();

    if !preferred.is_empty() {
        return preferred;
    }

    let mut others: Vec<&(String, String)> = interfaces
        .iter()
        .filter(|(_, addr)| !addr.is_empty())
        .collect();
    if others.is_empty() {
        return PLACEHOLDER_ADDRESS.to_string();
    }

    // Stable sort keeps per-interface address order
    others.sort_by(|a, b| a.0.cmp(&b.0));
    others.into_iter().map(|(_, addr)| addr.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, addr: &str) -> (String, String) {
        (name.to_string(), addr.to_string())
    }

    #[test]
    fn test_known_digest() {
        let fp = compute_fingerprint("1.2.3.4", "iOS 17.0");
        assert_eq!(
            fp.as_str(),
            "26be7a2625d74bb1bc75906d1d0dc809e89408782307409911f524745b762c15"
        );
        assert_eq!(fp.as_str().len(), FINGERPRINT_HEX_LEN);
    }

    #[test]
    fn test_deterministic() {
        let a = compute_fingerprint("1.2.3.4", "iOS 17.0");
        let b = compute_fingerprint("1.2.3.4", "iOS 17.0");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lowercase_hex() {
        let fp = compute_fingerprint("fe80::1", "iOS 16.4");
        assert!(fp
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_inputs_change_digest() {
        let base = compute_fingerprint("1.2.3.4", "iOS 17.0");
        assert_ne!(base, compute_fingerprint("1.2.3.5", "iOS 17.0"));
        assert_ne!(base, compute_fingerprint("1.2.3.4", "iOS 17.1"));
    }

    #[test]
    fn test_no_normalization() {
        let base = compute_fingerprint("1.2.3.4", "iOS 17.0");
        assert_ne!(base, compute_fingerprint("1.2.3.4", "ios 17.0"));
        assert_ne!(base, compute_fingerprint(" 1.2.3.4", "iOS 17.0"));
    }

    #[test]
    fn test_plain_concatenation() {
        // No separator: the split point does not matter
        assert_eq!(
            compute_fingerprint("1.2.3.4", "iOS 17.0"),
            compute_fingerprint("1.2.3.4iOS", " 17.0")
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(
            compute_fingerprint("", "").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_select_prefers_wifi_then_cellular() {
        let interfaces = vec![
            iface("pdp_ip0", "192.168.1.9"),
            iface("lo0", "127.0.0.1"),
            iface("en0", "10.0.0.5"),
        ];
        assert_eq!(select_address(&interfaces), "10.0.0.5192.168.1.9");
    }

    #[test]
    fn test_select_cellular_only() {
        let interfaces = vec![iface("lo0", "127.0.0.1"), iface("pdp_ip0", "100.64.0.2")];
        assert_eq!(select_address(&interfaces), "100.64.0.2");
    }

    #[test]
    fn test_select_falls_back_to_other_interfaces() {
        let interfaces = vec![iface("wlan0", "10.1.1.1"), iface("eth0", "172.16.0.4")];
        assert_eq!(select_address(&interfaces), "172.16.0.410.1.1.1");
    }

    #[test]
    fn test_select_placeholder_when_empty() {
        assert_eq!(select_address(&[]), PLACEHOLDER_ADDRESS);
        assert_eq!(select_address(&[iface("eth0", "")]), PLACEHOLDER_ADDRESS);
    }

    #[test]
    fn test_combined_address_digest() {
        let interfaces = vec![iface("en0", "10.0.0.5"), iface("pdp_ip0", "192.168.1.9")];
        let fp = compute_fingerprint(&select_address(&interfaces), "iOS 17.0");
        assert_eq!(
            fp.as_str(),
            "f5a027b8b1e7832fcf8354183bbe7478f63df801cbd650fd8b39c0ce469a2dc3"
        );
    }
}
