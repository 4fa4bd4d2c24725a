use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP path every command is POSTed to
pub const CAST_PATH: &str = "/api/cast";

/// WebSocket path for player status notifications
pub const NOTIFICATION_PATH: &str = "/api/notification";

/// Commands understood by the device daemon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Connect,
    #[serde(rename = "showPairingQRCode")]
    ShowPairingQrCode,
    DeviceMetrics,
    #[serde(rename = "sendKeyboardEvent")]
    KeyboardEvent,
    DragGesture,
    TapGesture,
    Rotate,
    Shutdown,
    Reboot,
    AnalyticsToggle,
    BetaFeaturesToggle,
    #[serde(rename = "getDeviceStatus")]
    DeviceStatus,
    #[serde(rename = "updateToLatestVersion")]
    Update,
    FactoryReset,
    UploadLogs,
    SetVolume,
    ToggleMute,
    DisplayPlaylist,
}

/// Body of every command request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandEnvelope {
    pub command: Command,
    pub request: Option<Value>,
}

impl CommandEnvelope {
    /// Create an envelope with no request payload
    pub fn new(command: Command) -> Self {
        Self {
            command,
            request: None,
        }
    }

    /// Set the request payload
    pub fn with_request(mut self, request: Value) -> Self {
        self.request = Some(request);
        self
    }
}
