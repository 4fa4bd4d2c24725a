use serde::{Deserialize, Serialize};

/// Port the FF1 command daemon listens on
pub const DEFAULT_PORT: u16 = 1111;

/// Hostname prefix FF1 devices advertise on the LAN (`FF1-XXXXXXXX`)
pub const HOSTNAME_PREFIX: &str = "ff1-";

/// A resolved, addressable FF1 device
///
/// Produced by [`crate::Discovery`] from the `FF1_HOST` override, the config
/// file, or a network scan. Pass it to [`crate::Ff1Client::from_descriptor`]
/// to start sending commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Bare hostname or IP literal
    pub host: String,
    pub port: u16,
    /// Human-readable label
    pub name: String,
    /// Sent as the `API-KEY` header on every command
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sent as the `topicID` query parameter on every command
    #[serde(default)]
    pub topic_id: Option<String>,
}

impl DeviceDescriptor {
    /// Create a descriptor with no credentials, named after its host
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        Self {
            name: host.clone(),
            host,
            port,
            api_key: None,
            topic_id: None,
        }
    }

    /// Replace the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the topic ID
    pub fn with_topic_id(mut self, topic_id: Option<String>) -> Self {
        self.topic_id = topic_id;
        self
    }
}

/// MAC addresses reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacInfo {
    #[serde(default)]
    pub eth0: String,
    #[serde(default)]
    pub wlan0: String,
}

/// Response to `getDeviceStatus`
///
/// Every field is optional on the wire; missing fields take the empty
/// string, `false`, or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatus {
    pub screen_rotation: String,
    pub connected_wifi: String,
    pub installed_version: String,
    pub latest_version: String,
    pub analytics_disabled: bool,
    pub beta_features_enabled: bool,
    pub mac_info: MacInfo,
    /// Volume in percent
    pub volume: i64,
    pub is_muted: bool,
}

/// Display settings reported alongside player status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub scaling: String,
    pub orientation: String,
}

/// One entry of the playing playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatusItem {
    pub id: String,
    pub title: String,
    /// Display duration in seconds
    pub duration: i64,
    pub license: String,
}

/// Playback state pushed over the notification WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStatus {
    pub cast_command: String,
    #[serde(rename = "playlistURL")]
    pub playlist_url: String,
    /// Raw DP1 document currently loaded, if any
    pub playlist: Option<serde_json::Value>,
    pub index: i64,
    pub is_paused: bool,
    pub items: Vec<PlayerStatusItem>,
    pub ok: bool,
    pub error: String,
    pub device_settings: DeviceSettings,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            cast_command: String::new(),
            playlist_url: String::new(),
            playlist: None,
            index: 0,
            is_paused: false,
            items: Vec::new(),
            ok: true,
            error: String::new(),
            device_settings: DeviceSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_defaults_name_to_host() {
        let device = DeviceDescriptor::new("10.0.0.5", DEFAULT_PORT);
        assert_eq!(device.name, "10.0.0.5");
        assert_eq!(device.port, 1111);
        assert!(device.api_key.is_none());
        assert!(device.topic_id.is_none());
    }

    #[test]
    fn test_device_status_parses_full_payload() {
        let status: DeviceStatus = serde_json::from_value(json!({
            "screenRotation": "portrait",
            "connectedWifi": "TestWifi",
            "installedVersion": "1.0.0",
            "latestVersion": "1.0.1",
            "analyticsDisabled": false,
            "betaFeaturesEnabled": true,
            "macInfo": {"eth0": "aa:bb", "wlan0": ""},
            "volume": 75,
            "isMuted": true
        }))
        .unwrap();

        assert_eq!(status.screen_rotation, "portrait");
        assert_eq!(status.latest_version, "1.0.1");
        assert!(status.beta_features_enabled);
        assert_eq!(status.mac_info.eth0, "aa:bb");
        assert_eq!(status.volume, 75);
        assert!(status.is_muted);
    }

    #[test]
    fn test_device_status_defaults_missing_fields() {
        let status: DeviceStatus = serde_json::from_value(json!({"volume": 10})).unwrap();
        assert_eq!(status.volume, 10);
        assert_eq!(status.screen_rotation, "");
        assert_eq!(status.mac_info, MacInfo::default());
        assert!(!status.is_muted);
    }

    #[test]
    fn test_player_status_defaults() {
        let status: PlayerStatus = serde_json::from_value(json!({})).unwrap();
        assert!(status.ok);
        assert!(status.items.is_empty());
        assert!(status.playlist.is_none());
    }

    #[test]
    fn test_player_status_wire_names() {
        let status: PlayerStatus = serde_json::from_value(json!({
            "castCommand": "displayPlaylist",
            "playlistURL": "https://example.com/pl.json",
            "index": 2,
            "isPaused": true,
            "items": [{"id": "a", "title": "One", "duration": 60, "license": "open"}],
            "deviceSettings": {"scaling": "fit", "orientation": "landscape"}
        }))
        .unwrap();

        assert_eq!(status.cast_command, "displayPlaylist");
        assert_eq!(status.playlist_url, "https://example.com/pl.json");
        assert_eq!(status.index, 2);
        assert!(status.is_paused);
        assert_eq!(status.items[0].duration, 60);
        assert_eq!(status.device_settings.orientation, "landscape");
    }
}
