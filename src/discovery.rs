use crate::address;
use crate::config::{self, DiscoveryConfig};
use crate::error::{Ff1Error, Result};
use crate::neighbor::{ArpScanner, CandidateSource};
use crate::probe::{HttpProbe, LivenessProbe};
use crate::types::DeviceDescriptor;
use futures_util::future::join_all;
use std::time::Duration;

/// Probe timeout used by [`Discovery::discover_default`]
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolves which FF1 devices to talk to
///
/// Sources are tried in a fixed order and the first one that yields
/// anything wins:
///
/// 1. the single-device override (`FF1_HOST`),
/// 2. the config file device list,
/// 3. a network scan: neighbor table candidates, each verified by a probe.
///
/// Nothing is cached between calls.
///
/// # Example
///
/// ```no_run
/// use ff1_control::{Discovery, Ff1Client};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let discovery = Discovery::from_env();
///     let devices = discovery.discover(Duration::from_secs(3)).await;
///
///     for device in &devices {
///         println!("Found {} at {}:{}", device.name, device.host, device.port);
///     }
///
///     if let [device] = devices.as_slice() {
///         let client = Ff1Client::from_descriptor(device)?;
///         println!("{:?}", client.get_device_status().await?);
///     }
///     Ok(())
/// }
/// ```
pub struct Discovery<S = ArpScanner, P = HttpProbe> {
    config: DiscoveryConfig,
    scanner: S,
    prober: P,
}

impl Discovery {
    /// Discovery with the system neighbor table and HTTP probing
    pub fn new(config: DiscoveryConfig) -> Self {
        Self::with_components(config, ArpScanner::new(), HttpProbe::new())
    }

    /// Discovery configured from `FF1_*` environment variables
    pub fn from_env() -> Self {
        Self::new(DiscoveryConfig::from_env())
    }
}

impl<S: CandidateSource, P: LivenessProbe> Discovery<S, P> {
    /// Discovery with a custom candidate source and prober
    pub fn with_components(config: DiscoveryConfig, scanner: S, prober: P) -> Self {
        Self {
            config,
            scanner,
            prober,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Find devices: static sources first, network scan as fallback.
    ///
    /// An empty result means no device could be resolved; more than one
    /// means the caller has to pick (see [`select_device`]).
    pub async fn discover(&self, probe_timeout: Duration) -> Vec<DeviceDescriptor> {
        let devices = self.resolve_static();
        if !devices.is_empty() {
            tracing::debug!("Using {} statically configured device(s)", devices.len());
            return devices;
        }
        self.scan_network(probe_timeout).await
    }

    /// [`Discovery::discover`] with [`DEFAULT_PROBE_TIMEOUT`]
    pub async fn discover_default(&self) -> Vec<DeviceDescriptor> {
        self.discover(DEFAULT_PROBE_TIMEOUT).await
    }

    /// Devices from the override or, when no override is set, the config file.
    ///
    /// An override that fails to parse yields nothing; the config file is
    /// not consulted in that case.
    pub fn resolve_static(&self) -> Vec<DeviceDescriptor> {
        if let Some(raw) = self
            .config
            .host_override
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            return match address::normalize(raw) {
                Ok(normalized) => {
                    tracing::debug!("Using override device {}:{}", normalized.host, normalized.port);
                    vec![DeviceDescriptor::new(normalized.host, normalized.port)
                        .with_api_key(self.config.api_key_override.clone())
                        .with_topic_id(self.config.topic_id_override.clone())]
                }
                Err(e) => {
                    tracing::warn!("Ignoring unusable {}: {}", config::ENV_HOST, e);
                    Vec::new()
                }
            };
        }

        match self.config.locate_config() {
            Some(path) => config::load_devices(&path),
            None => Vec::new(),
        }
    }

    /// Scan the neighbor table and keep the candidates that answer a probe.
    ///
    /// All probes run concurrently; results keep candidate order and carry
    /// the neighbor-table name.
    pub async fn scan_network(&self, probe_timeout: Duration) -> Vec<DeviceDescriptor> {
        let candidates = self.scanner.candidates().await;
        if candidates.is_empty() {
            tracing::debug!("No FF1 candidates in neighbor table");
            return Vec::new();
        }

        tracing::info!("Probing {} FF1 candidate(s)", candidates.len());

        let probes = candidates
            .iter()
            .map(|c| self.prober.probe(&c.host, c.port, probe_timeout));
        let results = join_all(probes).await;

        let verified: Vec<DeviceDescriptor> = candidates
            .into_iter()
            .zip(results)
            .filter_map(|(candidate, result)| {
                result.map(|device| device.with_name(candidate.name))
            })
            .collect();

        tracing::info!("Verified {} FF1 device(s)", verified.len());
        verified
    }
}

/// Pick one device from a discovery result.
///
/// With a selector, a device whose name matches (ignoring case) wins;
/// otherwise the selector is used as a host string. Without a selector
/// exactly one device must have been found.
pub fn select_device(
    devices: &[DeviceDescriptor],
    selector: Option<&str>,
) -> Result<DeviceDescriptor> {
    if let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(device) = devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(selector))
        {
            return Ok(device.clone());
        }

        return match address::normalize(selector) {
            Ok(normalized) => Ok(DeviceDescriptor::new(normalized.host, normalized.port)),
            Err(e) => Err(Ff1Error::InvalidRequest(format!(
                "{:?} is neither a known device name nor a host: {}",
                selector, e
            ))),
        };
    }

    match devices {
        [] => Err(Ff1Error::NoDevices),
        [device] => Ok(device.clone()),
        _ => Err(Ff1Error::AmbiguousDevice(
            devices
                .iter()
                .map(|d| format!("{} ({})", d.name, d.host))
                .collect(),
        )),
    }
}
