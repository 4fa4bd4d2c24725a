use crate::types::DEFAULT_PORT;
use reqwest::Url;
use thiserror::Error;

/// Reasons a raw host string could not be normalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Input was empty after trimming
    #[error("empty host string")]
    Empty,

    /// Input could not be parsed as a URL (bad port, bad characters, ...)
    #[error("unparseable host string {raw:?}: {reason}")]
    Unparseable { raw: String, reason: String },

    /// URL parsed but carried no hostname
    #[error("no hostname in {0:?}")]
    MissingHost(String),

    /// Port was present but zero
    #[error("invalid port in {0:?}")]
    InvalidPort(String),
}

/// A normalized host and port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    /// Bare hostname or IP literal (IPv6 without brackets)
    pub host: String,
    pub port: u16,
}

/// Normalize a raw host string into a host and port.
///
/// Hosts arrive from config files and the `FF1_HOST` override as a bare
/// host, `host:port`, or a full URL (possibly with a bracketed IPv6 literal).
/// Strings without a scheme are treated as `http://...`, so `10.0.0.5:1111`
/// and `http://10.0.0.5:1111/api` give the same result. A missing port
/// falls back to [`DEFAULT_PORT`].
pub fn normalize(raw: &str) -> Result<HostPort, AddressError> {
    normalize_with_default(raw, DEFAULT_PORT)
}

/// [`normalize`] with a caller-chosen port for strings that carry none
pub fn normalize_with_default(raw: &str, default_port: u16) -> Result<HostPort, AddressError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| AddressError::Unparseable {
        raw: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AddressError::MissingHost(trimmed.to_string()))?
        .to_string();

    // `Url::port` hides a port equal to the scheme default, so `host:80`
    // needs the raw authority to tell "explicit 80" from "no port".
    let port = match url.port() {
        Some(port) => port,
        None if has_explicit_port(&candidate) => {
            url.port_or_known_default().unwrap_or(default_port)
        }
        None => default_port,
    };

    if port == 0 {
        return Err(AddressError::InvalidPort(trimmed.to_string()));
    }

    Ok(HostPort { host, port })
}

/// Render `host:port` for use inside a URL, bracketing IPv6 literals
pub fn authority(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

fn has_explicit_port(url: &str) -> bool {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map(|(_, hp)| hp).unwrap_or(authority);

    let port_part = if host_port.starts_with('[') {
        host_port.split_once("]:").map(|(_, port)| port)
    } else {
        host_port.rsplit_once(':').map(|(_, port)| port)
    };

    port_part.is_some_and(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hp(host: &str, port: u16) -> HostPort {
        HostPort {
            host: host.to_string(),
            port,
        }
    }

    #[test]
    fn test_bare_host_uses_default_port() {
        assert_eq!(normalize("192.168.1.100").unwrap(), hp("192.168.1.100", DEFAULT_PORT));
        assert_eq!(normalize("ff1-abc.local").unwrap(), hp("ff1-abc.local", DEFAULT_PORT));
    }

    #[test]
    fn test_host_and_port() {
        assert_eq!(normalize("192.168.1.100:1212").unwrap(), hp("192.168.1.100", 1212));
    }

    #[test]
    fn test_with_and_without_scheme_match() {
        assert_eq!(
            normalize("192.168.1.100:1111").unwrap(),
            normalize("http://192.168.1.100:1111").unwrap()
        );
    }

    #[test]
    fn test_full_url_strips_path() {
        assert_eq!(
            normalize("http://192.168.1.100:1111/api").unwrap(),
            hp("192.168.1.100", 1111)
        );
        assert_eq!(normalize("https://device.lan/x/y").unwrap(), hp("device.lan", DEFAULT_PORT));
    }

    #[test]
    fn test_ipv6_brackets_removed() {
        assert_eq!(
            normalize("http://[2001:db8::1]:1212/api").unwrap(),
            hp("2001:db8::1", 1212)
        );
        assert_eq!(normalize("[2001:db8::1]").unwrap(), hp("2001:db8::1", DEFAULT_PORT));
    }

    #[test]
    fn test_scheme_default_port_kept_when_explicit() {
        assert_eq!(normalize("10.0.0.5:80").unwrap(), hp("10.0.0.5", 80));
        assert_eq!(normalize("https://10.0.0.5:443/").unwrap(), hp("10.0.0.5", 443));
        assert_eq!(normalize("http://[::1]:80").unwrap(), hp("::1", 80));
    }

    #[test]
    fn test_custom_default_port() {
        assert_eq!(normalize_with_default("10.0.0.5", 1212).unwrap(), hp("10.0.0.5", 1212));
        assert_eq!(normalize_with_default("10.0.0.5:1111", 1212).unwrap(), hp("10.0.0.5", 1111));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize("  10.0.0.5:1111\n").unwrap(), hp("10.0.0.5", 1111));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            normalize("192.168.1.100:not-a-port"),
            Err(AddressError::Unparseable { .. })
        ));
        assert!(normalize("192.168.1.100:99999").is_err());
        assert_eq!(
            normalize("192.168.1.100:0"),
            Err(AddressError::InvalidPort("192.168.1.100:0".to_string()))
        );
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(normalize(""), Err(AddressError::Empty));
        assert_eq!(normalize("   "), Err(AddressError::Empty));
        assert!(normalize("http://").is_err());
        assert!(normalize("file:///etc/hosts").is_err());
    }

    #[test]
    fn test_authority_brackets_ipv6() {
        assert_eq!(authority("10.0.0.5", 1111), "10.0.0.5:1111");
        assert_eq!(authority("2001:db8::1", 1111), "[2001:db8::1]:1111");
    }
}
