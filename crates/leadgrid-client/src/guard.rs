//! Target checks applied before the browser visits a business website.
//!
//! Websites come from third-party listing data, so a listing pointing at
//! `http://169.254.169.254/` or a LAN address must not be loaded from inside
//! the server's network.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use leadgrid_core::error::AppError;
use url::Url;

/// Parse `raw` and reject it unless it is a public http(s) URL.
///
/// With `allow_private` set, only the scheme is checked.
pub async fn check_site(raw: &str, allow_private: bool) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::HttpError(format!("Invalid website URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::HttpError(format!(
            "Website scheme '{}' is not allowed (only http/https)",
            url.scheme()
        )));
    }
    if allow_private {
        return Ok(url);
    }

    let host = url
        .host_str()
        .ok_or_else(|| AppError::HttpError("Website URL has no host".into()))?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    let addrs: Vec<IpAddr> = match bare.parse::<IpAddr>() {
        Ok(ip) => vec![ip],
        Err(_) => {
            let port = url.port_or_known_default().unwrap_or(80);
            tokio::net::lookup_host((bare, port))
                .await
                .map_err(|e| AppError::NetworkError(format!("DNS lookup failed for {host}: {e}")))?
                .map(|sa| sa.ip())
                .collect()
        }
    };

    if addrs.is_empty() {
        return Err(AppError::NetworkError(format!("No addresses found for {host}")));
    }
    if let Some(ip) = addrs.into_iter().find(|ip| is_reserved(*ip)) {
        return Err(AppError::HttpError(format!(
            "Blocked website {host}: resolves to reserved address {ip}"
        )));
    }
    Ok(url)
}

fn is_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(v6) => is_reserved_v6(v6),
    }
}

fn is_reserved_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xC0) == 64)
}

fn is_reserved_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_reserved_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fe80::/10
        || (first & 0xFFC0) == 0xFE80
        // fc00::/7
        || (first & 0xFE00) == 0xFC00
}
