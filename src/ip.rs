//! Client address resolution behind proxies.
//!
//! `X-Forwarded-For` is a list each proxy appends to, so only the entries
//! added by proxies we trust are reliable. [`ProxyTrust::client_ip`] walks the
//! list from the right and stops at the first hop it does not trust.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::options::Options;

/// Request header listing the addresses a request was forwarded for.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Request header a single trusted proxy sets to the client address.
pub const X_REAL_IP: &str = "x-real-ip";

/// Which forwarding hops are trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTrust {
    trust_private: bool,
    ranges: Vec<IpNet>,
}

impl Default for ProxyTrust {
    /// Private addresses are trusted, no extra ranges.
    fn default() -> Self {
        Self { trust_private: true, ranges: Vec::new() }
    }
}

impl From<&Options> for ProxyTrust {
    fn from(options: &Options) -> Self {
        Self { trust_private: options.trust_private_ip, ranges: options.trusted_proxies.clone() }
    }
}

impl ProxyTrust {
    pub fn new(trust_private: bool, ranges: Vec<IpNet>) -> Self {
        Self { trust_private, ranges }
    }

    pub fn set_trust_private(&mut self, flag: bool) {
        self.trust_private = flag;
    }

    pub fn register(&mut self, range: IpNet) {
        self.ranges.push(range);
    }

    pub fn can_trust(&self, ip: IpAddr) -> bool {
        (self.trust_private && is_private(ip)) || self.ranges.iter().any(|range| range.contains(&ip))
    }

    /// The first untrusted address in `forwarded`, read right to left.
    ///
    /// `forwarded` holds the raw header values; each may carry several
    /// comma-separated hops. No hops at all, or a hop that is not an IP
    /// address, yields `peer`. When every hop is trusted the leftmost one
    /// is the client.
    pub fn client_ip<'a>(
        &self,
        forwarded: impl IntoIterator<Item = &'a str>,
        peer: Option<IpAddr>,
    ) -> Option<IpAddr> {
        let hops: Vec<&str> = forwarded.into_iter().flat_map(|value| value.split(',')).collect();

        let mut leftmost = None;
        for hop in hops.iter().rev() {
            let Some(ip) = parse_hop(hop) else {
                return peer;
            };
            if !self.can_trust(ip) {
                return Some(ip);
            }
            leftmost = Some(ip);
        }
        leftmost.or(peer)
    }
}

/// Accepts bare and bracketed forms: `10.0.0.1`, `::1`, `[::1]`.
fn parse_hop(hop: &str) -> Option<IpAddr> {
    let hop = hop.trim();
    let hop = hop.strip_prefix('[').unwrap_or(hop);
    let hop = hop.strip_suffix(']').unwrap_or(hop);
    hop.parse().ok()
}

/// RFC 1918 for IPv4 (including IPv4-mapped IPv6), `fc00::/7` for IPv6.
fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.is_private(),
            None => (v6.segments()[0] & 0xfe00) == 0xfc00,
        },
    }
}
