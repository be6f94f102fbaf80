//! SSRF (Server-Side Request Forgery) protection for webhook destinations
//!
//! Webhook URLs are supplied by integrations, so deliveries must not be
//! steerable at loopback, private or cloud-metadata addresses.

use std::net::{IpAddr, Ipv4Addr};
use url::Url;

/// Hosts that are refused regardless of how they resolve
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "0",
    "metadata.google.internal",
    "metadata",
    "internal",
    "local",
];

/// Validate a destination URL against SSRF targets.
///
/// Checks scheme (http/https), presence of a host, blocked host names and
/// private, loopback or link-local IP literals, including decimal and hex
/// encoded IPv4.
pub fn validate_url_against_ssrf(url_str: &str, context: &str) -> Result<(), String> {
    let url =
        Url::parse(url_str).map_err(|e| format!("{} has invalid URL format: {}", context, e))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "{} must use http:// or https:// scheme, got: {}",
                context, scheme
            ));
        }
    }

    let host = url
        .host_str()
        .ok_or_else(|| format!("{} URL must have a valid host", context))?;
    let host_lower = host.to_lowercase();

    for blocked in BLOCKED_HOSTS {
        if host_lower == *blocked || host_lower.ends_with(&format!(".{}", blocked)) {
            return Err(format!(
                "{} URL host '{}' is blocked (SSRF protection)",
                context, host
            ));
        }
    }

    let literal = host_lower.trim_start_matches('[').trim_end_matches(']');
    let ip = literal
        .parse::<IpAddr>()
        .ok()
        .or_else(|| literal.parse::<u32>().ok().map(|n| IpAddr::V4(Ipv4Addr::from(n))))
        .or_else(|| {
            literal
                .strip_prefix("0x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .map(|n| IpAddr::V4(Ipv4Addr::from(n)))
        });

    if let Some(ip) = ip {
        if is_private_or_internal_ip(&ip) {
            return Err(format!(
                "{} URL host '{}' is a private/internal address (SSRF protection)",
                context, host
            ));
        }
    }

    Ok(())
}

fn is_private_or_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_loopback()
                || ipv4.is_private()
                // 169.254.0.0/16, cloud metadata endpoints live here
                || ipv4.is_link_local()
                || ipv4.is_broadcast()
                || ipv4.is_documentation()
                || ipv4.is_unspecified()
                // 100.64.0.0/10
                || (ipv4.octets()[0] == 100 && (ipv4.octets()[1] & 0xC0) == 64)
                || ipv4.octets()[0] >= 240
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // fc00::/7
                || ((ipv6.segments()[0] & 0xfe00) == 0xfc00)
                // fe80::/10
                || ((ipv6.segments()[0] & 0xffc0) == 0xfe80)
                || ipv6.to_ipv4_mapped().is_some_and(|ipv4| {
                    ipv4.is_loopback() || ipv4.is_private() || ipv4.is_link_local()
                })
        }
    }
}
