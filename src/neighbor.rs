use crate::types::{DeviceDescriptor, DEFAULT_PORT, HOSTNAME_PREFIX};
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use regex::Regex;
use std::collections::HashSet;
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const REFRESH_TIMEOUT: Duration = Duration::from_secs(2);
const ARP_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of unverified scan candidates
pub trait CandidateSource: Send + Sync {
    /// Return candidate devices; failures yield an empty list
    fn candidates(&self) -> impl Future<Output = Vec<DeviceDescriptor>> + Send;
}

/// Reads candidates from the system `arp -a` table.
///
/// FF1 devices use `FF1-XXXXXXXX` hostnames, so the neighbor table names
/// them once any traffic has been exchanged. A broadcast ping nudges the
/// table before it is read.
#[derive(Debug, Clone)]
pub struct ArpScanner {
    refresh: bool,
}

impl ArpScanner {
    /// Scanner that sends a broadcast ping before reading the table
    pub fn new() -> Self {
        Self { refresh: true }
    }

    /// Skip the broadcast ping and read whatever the table holds
    pub fn without_refresh() -> Self {
        Self { refresh: false }
    }
}

impl Default for ArpScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSource for ArpScanner {
    async fn candidates(&self) -> Vec<DeviceDescriptor> {
        if self.refresh {
            refresh_neighbors().await;
        }

        match read_arp_table().await {
            Some(text) => {
                let devices = parse_neighbor_table(&text);
                tracing::debug!("Neighbor table yielded {} FF1 candidate(s)", devices.len());
                devices
            }
            None => Vec::new(),
        }
    }
}

fn arp_line_regex() -> &'static Regex {
    static ARP_LINE: OnceLock<Regex> = OnceLock::new();
    // hostname (ip) at mac ...
    ARP_LINE.get_or_init(|| {
        Regex::new(r"(?m)^(\S+)\s+\((\d+\.\d+\.\d+\.\d+)\)\s+at\s+(\S+)")
            .expect("static regex is valid")
    })
}

/// Parse `arp -a` output into FF1 candidates.
///
/// Keeps entries whose name (domain suffix removed) starts with `ff1-`,
/// ignoring case, one per IP address. Names are upper-cased.
pub fn parse_neighbor_table(text: &str) -> Vec<DeviceDescriptor> {
    let mut seen = HashSet::new();
    let mut devices = Vec::new();

    for caps in arp_line_regex().captures_iter(text) {
        let hostname = &caps[1];
        let ip = &caps[2];

        let name = hostname.split('.').next().unwrap_or(hostname);
        if !name.to_lowercase().starts_with(HOSTNAME_PREFIX) {
            continue;
        }
        if !seen.insert(ip.to_string()) {
            tracing::trace!("Duplicate neighbor entry for {}", ip);
            continue;
        }

        devices.push(DeviceDescriptor::new(ip, DEFAULT_PORT).with_name(name.to_uppercase()));
    }

    devices
}

async fn read_arp_table() -> Option<String> {
    let mut arp = Command::new("arp");
    arp.arg("-a").kill_on_drop(true);

    let output = match timeout(ARP_TIMEOUT, arp.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::debug!("arp unavailable: {}", e);
            return None;
        }
        Err(_) => {
            tracing::debug!("arp timed out after {:?}", ARP_TIMEOUT);
            return None;
        }
    };

    Some(decode_table(&output.stdout))
}

// Hostnames are not guaranteed to be UTF-8; a bad line must not hide the rest.
fn decode_table(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout).into_owned()
}

/// Ping the primary broadcast address so the neighbor table fills up.
/// Best effort: every failure is ignored.
async fn refresh_neighbors() {
    let Some(broadcast) = primary_broadcast_address() else {
        tracing::debug!("No broadcast address found, skipping neighbor refresh");
        return;
    };

    let mut ping = Command::new("ping");
    ping.kill_on_drop(true);
    #[cfg(target_os = "macos")]
    ping.args(["-c", "1", "-t", "1"]);
    #[cfg(not(target_os = "macos"))]
    ping.args(["-b", "-c", "1", "-W", "1"]);
    ping.arg(broadcast.to_string());

    match timeout(REFRESH_TIMEOUT, ping.output()).await {
        Ok(Ok(_)) => tracing::debug!("Sent broadcast ping to {}", broadcast),
        Ok(Err(e)) => tracing::debug!("Broadcast ping failed: {}", e),
        Err(_) => tracing::debug!("Broadcast ping to {} timed out", broadcast),
    }
}

/// Broadcast address of the first non-loopback IPv4 interface
fn primary_broadcast_address() -> Option<Ipv4Addr> {
    let interfaces = NetworkInterface::show().ok()?;

    interfaces.iter().find_map(|iface| {
        iface.addr.iter().find_map(|addr| match addr {
            network_interface::Addr::V4(v4) if !v4.ip.is_loopback() => v4
                .broadcast
                .or_else(|| v4.netmask.map(|mask| broadcast_for(v4.ip, mask))),
            _ => None,
        })
    })
}

fn broadcast_for(ip: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(netmask))
}
