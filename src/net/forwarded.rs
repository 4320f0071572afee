//! Client IP resolution from forwarded-for header chains.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Resolve the client IP from an `x-forwarded-for` chain.
///
/// Scans the chain for the first public hop; proxies append addresses, so
/// earlier entries are closer to the original client. Falls back to the peer
/// address verbatim (even when private) and to an empty string when nothing
/// parses.
pub fn client_ip(forwarded_for: &str, peer: Option<SocketAddr>) -> String {
    for hop in forwarded_for.split(',') {
        if let Ok(ip) = hop.trim().parse::<IpAddr>() {
            if is_public(ip) {
                return ip.to_string();
            }
        }
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified())
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    // fc00::/7 unique local, fe80::/10 link local
    let seg = ip.segments()[0];
    !(ip.is_loopback() || ip.is_unspecified() || (seg & 0xfe00) == 0xfc00 || (seg & 0xffc0) == 0xfe80)
}
