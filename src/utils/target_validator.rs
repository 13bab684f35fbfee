//! Safety validation for redirect targets.
//!
//! A target must be an absolute `http` or `https` address. In strict mode the
//! host must additionally not point at loopback, unspecified or private IPv4
//! networks. The check is purely lexical: no DNS lookups are performed.

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Schemes a link is allowed to redirect to.
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Host names treated as loopback in strict mode.
const LOOPBACK_NAMES: &[&str] = &["localhost"];

/// Reasons a target address is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetRejection {
    #[error("target is empty")]
    Empty,

    #[error("invalid address: {0}")]
    InvalidFormat(String),

    #[error("scheme '{0}' is not allowed, only http and https")]
    UnsupportedScheme(String),

    #[error("host '{0}' points to a loopback or private network")]
    ForbiddenHost(String),
}

impl TargetRejection {
    /// Stable identifier for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            TargetRejection::Empty => "empty",
            TargetRejection::InvalidFormat(_) => "invalid_format",
            TargetRejection::UnsupportedScheme(_) => "unsupported_scheme",
            TargetRejection::ForbiddenHost(_) => "forbidden_host",
        }
    }
}

/// Validates a target address against the protocol and network policy.
///
/// # Rules
///
/// 1. The target must contain no control characters or surrounding
///    whitespace, and must parse as an absolute URL with a scheme
/// 2. The scheme must be `http` or `https`, in every mode
/// 3. With `strict`, the host must not be `localhost`, a loopback or
///    unspecified address (`127.0.0.0/8`, `0.0.0.0`, `::1`, `::`), or a
///    private IPv4 address (`10/8`, `172.16/12`, `192.168/16`), including
///    the IPv4-mapped IPv6 forms of those addresses
///
/// # Errors
///
/// Returns the first [`TargetRejection`] that applies.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_target("https://example.com/path", true).is_ok());
/// assert!(validate_target("http://localhost:3000", false).is_ok());
/// assert!(validate_target("http://localhost:3000", true).is_err());
/// assert!(validate_target("javascript:alert(1)", false).is_err());
/// ```
pub fn validate_target(target: &str, strict: bool) -> Result<Url, TargetRejection> {
    if target.trim().is_empty() {
        return Err(TargetRejection::Empty);
    }

    // The parser silently drops these, so the stored text would no longer be
    // the address that was checked, nor a valid Location header.
    if target.trim() != target || target.chars().any(char::is_control) {
        return Err(TargetRejection::InvalidFormat(
            "contains control characters or surrounding whitespace".to_string(),
        ));
    }

    let url = Url::parse(target).map_err(|e| TargetRejection::InvalidFormat(e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(TargetRejection::UnsupportedScheme(url.scheme().to_string()));
    }

    let Some(host) = url.host() else {
        return Err(TargetRejection::InvalidFormat("missing host".to_string()));
    };

    if strict && is_forbidden_host(&host) {
        return Err(TargetRejection::ForbiddenHost(host.to_string()));
    }

    Ok(url)
}

fn is_forbidden_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            LOOPBACK_NAMES
                .iter()
                .any(|n| name == *n || name.ends_with(&format!(".{n}")))
        }
        Host::Ipv4(addr) => is_forbidden_v4(addr),
        Host::Ipv6(addr) => is_forbidden_v6(addr),
    }
}

fn is_forbidden_v4(addr: &Ipv4Addr) -> bool {
    addr.is_loopback() || addr.is_unspecified() || addr.is_private()
}

fn is_forbidden_v6(addr: &Ipv6Addr) -> bool {
    if addr.is_loopback() || addr.is_unspecified() {
        return true;
    }
    addr.to_ipv4_mapped().is_some_and(|v4| is_forbidden_v4(&v4))
}
