// Validation utilities
use crate::error::{Error, Result};
use std::net::IpAddr;
use tracing::warn;
use url::Url;

/// Check if an IP address is in a private range
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            // 10.0.0.0/8
            octets[0] == 10
                // 172.16.0.0/12
                || (octets[0] == 172 && octets[1] >= 16 && octets[1] <= 31)
                // 192.168.0.0/16
                || (octets[0] == 192 && octets[1] == 168)
                // 169.254.0.0/16 (link-local)
                || (octets[0] == 169 && octets[1] == 254)
                // 127.0.0.0/8 (loopback)
                || octets[0] == 127
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
                // IPv6 link-local (fe80::/10)
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
                // IPv6 unique local (fc00::/7)
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
        }
    }
}

/// Validate a clone URL before it is handed to the parsing service
///
/// The URL must be http(s) with a public host; anything that could steer
/// the parsing service at internal infrastructure is refused.
pub fn validate_clone_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        _ => {
            warn!(
                "Security: Blocked non-HTTP(S) clone URL scheme: {} in URL: {}",
                url.scheme(),
                url_str
            );
            return Err(Error::Validation(format!(
                "Clone URL must use http or https scheme: {url_str}"
            )));
        }
    }

    let host = url
        .host_str()
        .ok_or_else(|| Error::Validation("Clone URL must have a valid host".to_string()))?;

    if host == "localhost" || host == "127.0.0.1" || host == "0.0.0.0" {
        warn!("Security: Blocked localhost clone URL: {}", url_str);
        return Err(Error::Validation(
            "Localhost clone URLs are not allowed".to_string(),
        ));
    }

    // Strip brackets from IPv6 addresses like "[::1]"
    let host_for_ip = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host_for_ip.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            warn!("Security: Blocked private-range clone URL: {}", url_str);
            return Err(Error::Validation(
                "Clone URLs must not point at private addresses".to_string(),
            ));
        }
    }

    Ok(url)
}
