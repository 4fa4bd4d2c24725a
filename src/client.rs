use crate::address;
use crate::error::{Ff1Error, Result};
use crate::notification::PlayerStatusReceiver;
use crate::protocol::{Command, CommandEnvelope, CAST_PATH, NOTIFICATION_PATH};
use crate::types::{DeviceDescriptor, DeviceStatus, PlayerStatus};
use crate::url_policy::UrlPolicy;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for LAN devices; system proxies are bypassed
pub(crate) fn lan_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// What to show with [`Ff1Client::display_playlist`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistSource {
    /// A DP1 document, sent inline
    Document(Value),
    /// URL of a DP1 document the device fetches itself
    Url(String),
}

/// Client for a single FF1 device
///
/// Commands are JSON envelopes POSTed to the device's `/api/cast` endpoint;
/// player status comes from the `/api/notification` WebSocket.
///
/// # Example
///
/// ```no_run
/// use ff1_control::Ff1Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Ff1Client::new("192.168.1.42", 1111)?.with_api_key("secret");
///     let status = client.get_device_status().await?;
///     println!("Running {}", status.installed_version);
///     client.set_volume(40).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Ff1Client {
    host: String,
    port: u16,
    api_key: Option<String>,
    topic_id: Option<String>,
    timeout: Duration,
    url_policy: UrlPolicy,
    http: reqwest::Client,
}

impl Ff1Client {
    /// Client for the device at `host:port`
    ///
    /// `host` may also be given as `host:port` or a URL; it is normalized
    /// the same way config entries are, with `port` applying only when the
    /// string carries none.
    pub fn new(host: impl AsRef<str>, port: u16) -> Result<Self> {
        let normalized = address::normalize_with_default(host.as_ref(), port)
            .map_err(|e| Ff1Error::InvalidRequest(format!("invalid device host: {}", e)))?;
        Ok(Self::bound_to(normalized.host, normalized.port))
    }

    /// Client for a discovered device, carrying its credentials
    pub fn from_descriptor(device: &DeviceDescriptor) -> Result<Self> {
        if device.host.trim().is_empty() || device.port == 0 {
            return Err(Ff1Error::InvalidRequest(format!(
                "device {:?} has no usable address",
                device.name
            )));
        }

        Ok(Self {
            api_key: device.api_key.clone(),
            topic_id: device.topic_id.clone(),
            ..Self::bound_to(device.host.clone(), device.port)
        })
    }

    fn bound_to(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            api_key: None,
            topic_id: None,
            timeout: DEFAULT_TIMEOUT,
            url_policy: UrlPolicy::from_env(),
            http: lan_http_client(),
        }
    }

    /// Send `API-KEY` with every command
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Send `topicID` with every command
    pub fn with_topic_id(mut self, topic_id: impl Into<String>) -> Self {
        self.topic_id = Some(topic_id.into());
        self
    }

    /// Per-request timeout (default 30 seconds)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the URL policy read from the environment
    pub fn with_url_policy(mut self, policy: UrlPolicy) -> Self {
        self.url_policy = policy;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send a raw command and return the device's JSON reply
    pub async fn send_command(&self, command: Command, request: Option<Value>) -> Result<Value> {
        let envelope = CommandEnvelope { command, request };
        let url = format!("http://{}{}", address::authority(&self.host, self.port), CAST_PATH);

        let mut builder = self.http.post(&url).json(&envelope).timeout(self.timeout);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("API-KEY", api_key);
        }
        if let Some(topic_id) = &self.topic_id {
            builder = builder.query(&[("topicID", topic_id)]);
        }

        tracing::debug!("Sending {:?} to {}", command, url);
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Ff1Error::Timeout
            } else {
                Ff1Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Ff1Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!("Non-JSON reply to {:?}: {}", command, text);
            Ff1Error::InvalidResponse(format!("reply is not JSON: {}", e))
        })
    }

    /// Get device status (orientation, wifi, versions, volume, ...)
    pub async fn get_device_status(&self) -> Result<DeviceStatus> {
        let data = self.send_command(Command::DeviceStatus, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Rotate the screen
    pub async fn rotate(&self, clockwise: bool) -> Result<Value> {
        self.send_command(Command::Rotate, Some(json!({ "clockwise": clockwise })))
            .await
    }

    /// Set volume in percent (0-100)
    pub async fn set_volume(&self, percent: u8) -> Result<Value> {
        if percent > 100 {
            return Err(Ff1Error::InvalidRequest(format!(
                "volume must be between 0 and 100, got {}",
                percent
            )));
        }
        self.send_command(Command::SetVolume, Some(json!({ "percent": percent })))
            .await
    }

    pub async fn toggle_mute(&self) -> Result<Value> {
        self.send_command(Command::ToggleMute, None).await
    }

    /// Send a keyboard event (e.g. 13 for Enter)
    pub async fn send_key(&self, code: i64) -> Result<Value> {
        self.send_command(Command::KeyboardEvent, Some(json!({ "code": code })))
            .await
    }

    pub async fn shutdown(&self) -> Result<Value> {
        self.send_command(Command::Shutdown, None).await
    }

    pub async fn reboot(&self) -> Result<Value> {
        self.send_command(Command::Reboot, None).await
    }

    /// Trigger an OTA firmware update
    pub async fn update_firmware(&self) -> Result<Value> {
        self.send_command(Command::Update, None).await
    }

    /// Show a playlist now
    ///
    /// The URL policy is checked before anything is sent.
    pub async fn display_playlist(&self, source: PlaylistSource) -> Result<Value> {
        let request = match source {
            PlaylistSource::Url(url) => {
                self.url_policy.validate_url(&url)?;
                json!({ "playlistUrl": url })
            }
            PlaylistSource::Document(playlist) => {
                self.url_policy.validate_playlist(&playlist)?;
                json!({
                    "dp1_call": playlist,
                    "intent": { "action": "now_display" },
                })
            }
        };

        self.send_command(Command::DisplayPlaylist, Some(request))
            .await
    }

    /// Read the current player status from the notification feed
    pub async fn get_player_status(&self) -> Result<PlayerStatus> {
        let mut receiver = self.subscribe_player_status().await?;
        match timeout(NOTIFICATION_TIMEOUT, receiver.recv()).await {
            Ok(result) => result,
            Err(_) => Err(Ff1Error::Timeout),
        }
    }

    /// Subscribe to player status updates
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ff1_control::Ff1Client;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Ff1Client::new("192.168.1.42", 1111)?;
    ///     let mut rx = client.subscribe_player_status().await?;
    ///
    ///     while let Ok(status) = rx.recv().await {
    ///         println!("Playing item {} (paused: {})", status.index, status.is_paused);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub async fn subscribe_player_status(&self) -> Result<PlayerStatusReceiver> {
        let url = format!(
            "ws://{}{}",
            address::authority(&self.host, self.port),
            NOTIFICATION_PATH
        );
        match timeout(self.timeout, PlayerStatusReceiver::connect(&url)).await {
            Ok(result) => result,
            Err(_) => Err(Ff1Error::Timeout),
        }
    }
}
