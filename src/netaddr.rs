//! Local address discovery and data-channel address codecs
//!
//! Covers the three address encodings the data-channel negotiation needs:
//! the PORT/PASV comma tuple (`h1,h2,h3,h4,p1,p2`, port = 256·p1 + p2), the
//! RFC 2428 EPRT argument (`|proto|addr|port|`), and the EPSV reply form
//! (`(|||port|)`), plus the one-shot interface walk that finds the host's
//! advertisable IPv4/IPv6 addresses.

use crate::error::{FtpError, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::warn;

/// Divisor relating a port number to its two encoded bytes
const PORT_DIVISOR: u16 = 256;

/// Discover the host's first non-loopback IPv4 and IPv6 addresses
///
/// Walks the interface list once; either or both results may be absent.
/// Loopback is recognised by string equality with `127.0.0.1` and `::1`.
/// An enumeration failure is not fatal; callers fall back to passive-only
/// behavior when no address is known.
pub fn discover_local_addrs() -> (Option<Ipv4Addr>, Option<Ipv6Addr>) {
    let mut ip4 = None;
    let mut ip6 = None;

    let addrs = match nix::ifaddrs::getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!("could not enumerate interfaces: {}", e);
            return (None, None);
        }
    };

    for ifaddr in addrs {
        let Some(storage) = ifaddr.address else {
            continue;
        };
        if let Some(sin) = storage.as_sockaddr_in() {
            let addr = sin.ip();
            if ip4.is_none() && addr.to_string() != "127.0.0.1" {
                ip4 = Some(addr);
            }
        } else if let Some(sin6) = storage.as_sockaddr_in6() {
            let addr = sin6.ip();
            if ip6.is_none() && addr.to_string() != "::1" {
                ip6 = Some(addr);
            }
        }
    }

    (ip4, ip6)
}

/// Encode an IPv4 address and port as the PORT comma tuple
pub fn encode_host_port(addr: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = addr.octets();
    let p1 = port / PORT_DIVISOR;
    let p2 = port % PORT_DIVISOR;
    format!("{h1},{h2},{h3},{h4},{p1},{p2}")
}

/// Parse a number from the leading decimal digits of a token
///
/// Trailing non-digit bytes (a closing parenthesis, say) are ignored, the
/// way `atoi` would.
fn leading_number(token: &str) -> Option<u16> {
    let digits: String = token
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Decode a PORT comma tuple back into an address and port
pub fn decode_host_port(tuple: &str) -> Result<(Ipv4Addr, u16)> {
    let split: Vec<&str> = tuple.split(',').collect();
    if split.len() < 6 {
        return Err(FtpError::Parse(tuple.to_string()));
    }

    let mut octets = [0u8; 4];
    for (octet, token) in octets.iter_mut().zip(&split[..4]) {
        let n = leading_number(token).ok_or_else(|| FtpError::Parse(tuple.to_string()))?;
        *octet = u8::try_from(n).map_err(|_| FtpError::Parse(tuple.to_string()))?;
    }

    let p1 = leading_number(split[split.len() - 2])
        .ok_or_else(|| FtpError::Parse(tuple.to_string()))?;
    let p2 = leading_number(split[split.len() - 1])
        .ok_or_else(|| FtpError::Parse(tuple.to_string()))?;
    if p1 > 255 || p2 > 255 {
        return Err(FtpError::Parse(tuple.to_string()));
    }

    Ok((Ipv4Addr::from(octets), PORT_DIVISOR * p1 + p2))
}

/// Parse a 227 reply into the passive endpoint
///
/// Scans the first line up to `(` or `=`, then decodes the comma tuple that
/// follows; the last two tokens are the port bytes.
pub fn parse_pasv_reply(text: &str) -> Result<(Ipv4Addr, u16)> {
    let first_line = text.lines().next().unwrap_or("");
    let start = first_line
        .find(['(', '='])
        .ok_or_else(|| FtpError::Parse(first_line.to_string()))?;
    decode_host_port(&first_line[start + 1..])
}

/// Encode an EPRT argument: `|proto|addr|port|` with proto 1 = IPv4, 2 = IPv6
pub fn encode_eprt(addr: &IpAddr, port: u16) -> String {
    match addr {
        IpAddr::V4(v4) => format!("|1|{v4}|{port}|"),
        IpAddr::V6(v6) => format!("|2|{v6}|{port}|"),
    }
}

/// Decode an EPRT argument into an address and port
///
/// The first byte defines the delimiter (nominally `|`); four delimiters
/// bracket the protocol digit, the address literal, and the decimal port.
pub fn parse_eprt(arg: &str) -> Result<(IpAddr, u16)> {
    let delim = arg
        .chars()
        .next()
        .ok_or_else(|| FtpError::Parse(arg.to_string()))?;
    let fields: Vec<&str> = arg.split(delim).collect();
    // "|2|::1|50000|" splits into ["", "2", "::1", "50000", ""]
    if fields.len() != 5 || !fields[0].is_empty() || !fields[4].is_empty() {
        return Err(FtpError::Parse(arg.to_string()));
    }

    let addr = match fields[1] {
        "1" => IpAddr::V4(
            fields[2]
                .parse::<Ipv4Addr>()
                .map_err(|_| FtpError::Parse(arg.to_string()))?,
        ),
        "2" => IpAddr::V6(
            fields[2]
                .parse::<Ipv6Addr>()
                .map_err(|_| FtpError::Parse(arg.to_string()))?,
        ),
        _ => return Err(FtpError::Parse(arg.to_string())),
    };
    let port = fields[3]
        .parse::<u16>()
        .map_err(|_| FtpError::Parse(arg.to_string()))?;

    Ok((addr, port))
}

/// Parse a 229 reply into the extended-passive port (`(|||port|)`)
pub fn parse_epsv_reply(text: &str) -> Result<u16> {
    let first_line = text.lines().next().unwrap_or("");
    let start = first_line
        .find('(')
        .ok_or_else(|| FtpError::Parse(first_line.to_string()))?;
    let inner = &first_line[start + 1..];
    let delim = inner
        .chars()
        .next()
        .ok_or_else(|| FtpError::Parse(first_line.to_string()))?;
    let fields: Vec<&str> = inner.split(delim).collect();
    if fields.len() < 5 {
        return Err(FtpError::Parse(first_line.to_string()));
    }
    leading_number(fields[3]).ok_or_else(|| FtpError::Parse(first_line.to_string()))
}
