use crate::error::{Ff1Error, Result};
use crate::playlist::Playlist;
use reqwest::Url;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Turns URL validation on
pub const ENV_ENABLE_VALIDATION: &str = "FF1_ENABLE_URL_VALIDATION";
/// Lets local and private targets through when validation is on
pub const ENV_ALLOW_LOCAL: &str = "FF1_UNSAFE_ALLOW_LOCAL_URLS";

/// Outbound URL policy, disabled by default.
///
/// Playback commands make the device download arbitrary URLs. When the
/// policy is enabled, only public http(s) URLs without credentials pass;
/// local and private targets need the extra `allow_local` opt-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlPolicy {
    pub enabled: bool,
    pub allow_local: bool,
}

impl UrlPolicy {
    /// Policy that accepts everything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Policy that only accepts public http(s) URLs
    pub fn strict() -> Self {
        Self {
            enabled: true,
            allow_local: false,
        }
    }

    /// Read the policy from `FF1_ENABLE_URL_VALIDATION` and
    /// `FF1_UNSAFE_ALLOW_LOCAL_URLS`
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag(ENV_ENABLE_VALIDATION),
            allow_local: env_flag(ENV_ALLOW_LOCAL),
        }
    }

    /// Check a URL the device will fetch
    pub fn validate_url(&self, url: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let parsed = Url::parse(url)
            .map_err(|e| Ff1Error::UrlRejected(format!("invalid URL {:?}: {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Ff1Error::UrlRejected(
                "URL must use http:// or https://".to_string(),
            ));
        }

        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => return Err(Ff1Error::UrlRejected("URL must include a host".to_string())),
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Ff1Error::UrlRejected(
                "URLs with embedded credentials are not allowed".to_string(),
            ));
        }

        if self.allow_local {
            return Ok(());
        }

        if host == "localhost" || host == "localhost.localdomain" {
            return Err(Ff1Error::UrlRejected(
                "Local hosts are blocked by default for safety".to_string(),
            ));
        }

        let literal = host.trim_start_matches('[').trim_end_matches(']');
        match literal.parse::<IpAddr>() {
            Ok(ip) if is_restricted_ip(ip) => Err(Ff1Error::UrlRejected(
                "Private or local IP ranges are blocked by default for safety".to_string(),
            )),
            Ok(_) => Ok(()),
            Err(_) if host.ends_with(".local") || host.ends_with(".localdomain") => {
                Err(Ff1Error::UrlRejected(
                    "mDNS/local-domain hosts are blocked by default for safety".to_string(),
                ))
            }
            Err(_) => Ok(()),
        }
    }

    /// Check a DP1 document: it must parse as a playlist and every item
    /// source must pass [`UrlPolicy::validate_url`].
    pub fn validate_playlist(&self, playlist: &serde_json::Value) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if !playlist.is_object() {
            return Err(Ff1Error::InvalidRequest(
                "Playlist payload must be a JSON object".to_string(),
            ));
        }

        let parsed: Playlist = serde_json::from_value(playlist.clone()).map_err(|e| {
            Ff1Error::InvalidRequest(format!("Invalid DP1 playlist payload: {}", e))
        })?;

        for (index, item) in parsed.items.iter().enumerate() {
            self.validate_url(&item.source).map_err(|e| {
                Ff1Error::UrlRejected(format!(
                    "Playlist item at index {} has invalid source URL: {}",
                    index, e
                ))
            })?;
        }

        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn is_restricted_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_restricted_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_restricted_v4(v4),
            None => is_restricted_v6(v6),
        },
    }
}

fn is_restricted_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 100.64.0.0/10 shared address space
        || (a == 100 && (b & 0xc0) == 64)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_restricted_v6(ip: Ipv6Addr) -> bool {
    let [first, second, ..] = ip.segments();
    // Only 2000::/3 is global unicast; everything else is reserved,
    // unique local, link-local, site-local or multicast.
    if (first & 0xe000) != 0x2000 {
        return true;
    }
    // 2001::/23 IETF protocol assignments
    (first == 0x2001 && second < 0x0200)
        // 2001:db8::/32 documentation
        || (first == 0x2001 && second == 0x0db8)
}
