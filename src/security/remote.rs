//! Client identity extraction from the connection's remote address.

use std::net::IpAddr;

/// The remote address could not be turned into an IP.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid remote address {0:?}")]
pub struct InvalidRemoteAddr(pub String);

/// Parse the client IP out of a raw remote address such as `10.0.0.1:4312`
/// or `[fe80::1%eth0]:4312`.
///
/// Values that are not `host:port` are treated as a bare host. Any IPv6 zone
/// suffix (`%eth0`) is dropped, and IPv4-mapped IPv6 addresses come back as
/// IPv4.
pub fn client_ip(remote_addr: &str) -> Result<IpAddr, InvalidRemoteAddr> {
    let host = split_host_port(remote_addr).unwrap_or(remote_addr);
    let host = host.split('%').next().unwrap_or_default();

    host.parse::<IpAddr>()
        .map(|ip| ip.to_canonical())
        .map_err(|_| InvalidRemoteAddr(remote_addr.to_string()))
}

/// Split `host:port` / `[host]:port`, returning the host.
///
/// Returns `None` when there is no port or the host part is ambiguous
/// (an unbracketed IPv6 address).
fn split_host_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        tail.strip_prefix(':')?;
        return Some(host);
    }

    let (host, _port) = addr.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some(host)
}
