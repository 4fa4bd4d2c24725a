use thiserror::Error;

/// Result type for FF1 operations
pub type Result<T> = std::result::Result<T, Ff1Error>;

/// Errors that can occur when talking to FF1 devices
#[derive(Error, Debug)]
pub enum Ff1Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket connection error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Device answered with a non-success status code
    #[error("Device returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection was closed unexpectedly
    #[error("Connection closed")]
    ConnectionClosed,

    /// Request timed out waiting for response
    #[error("Request timeout")]
    Timeout,

    /// Device replied with a body that is not JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Outbound URL refused by the URL safety policy
    #[error("URL rejected: {0}")]
    UrlRejected(String),

    /// Command arguments failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Discovery found nothing to talk to
    #[error("No FF1 devices found. Ensure a device is on the network or create ff1.json")]
    NoDevices,

    /// Discovery found several devices and no selector picked one
    #[error("Multiple FF1 devices found: {}. Select one by name or host", .0.join(", "))]
    AmbiguousDevice(Vec<String>),

    /// Channel receive error
    #[error("Channel error: {0}")]
    ChannelError(String),
}
