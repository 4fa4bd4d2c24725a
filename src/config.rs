use crate::address;
use crate::types::DeviceDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Single-device override (`host`, `host:port` or URL)
pub const ENV_HOST: &str = "FF1_HOST";
/// API key for the override device
pub const ENV_API_KEY: &str = "FF1_API_KEY";
/// Topic ID for the override device
pub const ENV_TOPIC_ID: &str = "FF1_TOPIC_ID";
/// Explicit config file path
pub const ENV_CONFIG: &str = "FF1_CONFIG";

/// Where discovery looks for static devices.
///
/// Environment variables are only read by [`DiscoveryConfig::from_env`];
/// everything downstream takes the struct, so tests can inject their own.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Single device that replaces every other source when set
    pub host_override: Option<String>,
    pub api_key_override: Option<String>,
    pub topic_id_override: Option<String>,
    /// Explicit config path, used only if the file exists
    pub config_path: Option<PathBuf>,
    /// Fallback config locations, first existing wins
    pub search_paths: Vec<PathBuf>,
}

impl DiscoveryConfig {
    /// Build the configuration from `FF1_*` environment variables and the
    /// standard search paths (`./ff1.json`, `~/.config/ff1/config.json`).
    pub fn from_env() -> Self {
        Self {
            host_override: env_string(ENV_HOST),
            api_key_override: env_string(ENV_API_KEY),
            topic_id_override: env_string(ENV_TOPIC_ID),
            config_path: env_string(ENV_CONFIG).map(PathBuf::from),
            search_paths: default_search_paths(),
        }
    }

    /// Config that reads exactly one file and nothing else
    pub fn with_config_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// First existing config file, if any
    pub fn locate_config(&self) -> Option<PathBuf> {
        self.config_path
            .iter()
            .chain(self.search_paths.iter())
            .find(|p| p.is_file())
            .cloned()
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("ff1.json"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".config").join("ff1").join("config.json"));
    }
    paths
}

/// On-disk config document
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    devices: Vec<serde_json::Value>,
}

/// One `devices[]` entry
#[derive(Debug, Deserialize)]
struct ConfigDevice {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "apiKey")]
    api_key: Option<String>,
    #[serde(default, rename = "topicID")]
    topic_id: Option<String>,
}

/// Load the device list from a config file.
///
/// Entries with a missing, blank or unparseable host are skipped; the rest
/// load in file order. A file that cannot be read or is not a JSON object
/// yields no devices.
pub fn load_devices(path: &Path) -> Vec<DeviceDescriptor> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to read config {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let config: ConfigFile = match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to parse config {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let devices: Vec<DeviceDescriptor> = config
        .devices
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| parse_device_entry(index, entry))
        .collect();

    tracing::debug!("Loaded {} device(s) from {}", devices.len(), path.display());
    devices
}

fn parse_device_entry(index: usize, entry: serde_json::Value) -> Option<DeviceDescriptor> {
    let entry: ConfigDevice = match serde_json::from_value(entry) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::debug!("Skipping config device {}: {}", index, e);
            return None;
        }
    };

    let raw_host = entry.host.filter(|h| !h.trim().is_empty())?;
    let normalized = match address::normalize(&raw_host) {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::debug!("Skipping config device {}: {}", index, e);
            return None;
        }
    };

    let name = entry
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| normalized.host.clone());

    Some(
        DeviceDescriptor::new(normalized.host, normalized.port)
            .with_name(name)
            .with_api_key(entry.api_key)
            .with_topic_id(entry.topic_id),
    )
}
