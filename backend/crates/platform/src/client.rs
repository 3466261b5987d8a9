//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Device name recorded when the client sends no User-Agent
pub const UNKNOWN_DEVICE: &str = "Unknown device";

/// Where a request came from, as recorded on a device session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP address (peer address, or X-Forwarded-For behind a trusted proxy)
    pub ip: Option<IpAddr>,
    /// User-Agent string, shown to the user as the device title
    pub device_name: String,
}

impl ClientInfo {
    pub fn new(ip: Option<IpAddr>, device_name: impl Into<String>) -> Self {
        Self {
            ip,
            device_name: device_name.into(),
        }
    }

    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> String {
        self.ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Collect client information from request headers
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Peer address of the connection, if known
/// * `trust_forwarded` - Whether the peer is a proxy that sets X-Forwarded-For
pub fn extract_client_info(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> ClientInfo {
    let device_name = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or(UNKNOWN_DEVICE);

    ClientInfo::new(
        extract_client_ip(headers, direct_ip, trust_forwarded),
        device_name,
    )
}

/// Extract client IP address
///
/// X-Forwarded-For is client-controlled, so it is only read when
/// `trust_forwarded` is set (the server sits behind a reverse proxy).
/// Otherwise the peer address of the connection is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> Option<IpAddr> {
    if !trust_forwarded {
        return direct_ip;
    }
    // First address in X-Forwarded-For is the originating client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}
