//! Rust library for discovering and controlling FF1 art computers
//!
//! FF1 devices run a small command daemon on port 1111 that accepts JSON
//! commands over HTTP and pushes player status over a WebSocket. This
//! library supports:
//!
//! - Discovery from the `FF1_HOST` override, an `ff1.json` config file, or a
//!   LAN scan of the neighbor table with concurrent liveness probing
//! - Device control (status, rotation, volume, mute, keys, power, updates)
//! - Playback of DP1 playlists, inline or by URL
//! - Player status reads and subscriptions
//! - Building DP1 playlists from artwork URLs
//! - An opt-in safety policy for URLs the device is asked to fetch
//!
//! # Quick Start
//!
//! ```no_run
//! use ff1_control::{build_playlist, select_device, Discovery, Ff1Client, PlaylistOptions, PlaylistSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Override, then config file, then network scan
//!     let discovery = Discovery::from_env();
//!     let devices = discovery.discover_default().await;
//!
//!     // Exactly one device, or fail with the list of candidates
//!     let device = select_device(&devices, None)?;
//!     println!("Using {} at {}", device.name, device.host);
//!
//!     let client = Ff1Client::from_descriptor(&device)?;
//!     let playlist = build_playlist(
//!         &["https://example.com/art.html"],
//!         &PlaylistOptions::default().with_title("Quick Play"),
//!     );
//!     client
//!         .display_playlist(PlaylistSource::Document(playlist.to_value()?))
//!         .await?;
//!
//!     let status = client.get_player_status().await?;
//!     println!("Now showing item {}", status.index);
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know the address of a device, you can skip discovery:
//!
//! ```no_run
//! use ff1_control::Ff1Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Ff1Client::new("192.168.1.42", 1111)?;
//!     client.set_volume(30).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Address**: host string normalization shared by config and overrides
//! - **Config**: explicit discovery configuration and `ff1.json` loading
//! - **Neighbor**: `arp -a` scanning for `FF1-*` hostnames
//! - **Probe**: liveness checks against the command endpoint
//! - **Discovery**: source precedence and the concurrent scan
//! - **Client**: HTTP commands and the notification WebSocket
//! - **Playlist** / **UrlPolicy**: DP1 documents and outbound URL checks

pub mod address;
mod client;
pub mod config;
mod discovery;
mod error;
pub mod neighbor;
mod notification;
pub mod playlist;
pub mod probe;
mod protocol;
mod types;
pub mod url_policy;

#[cfg(test)]
mod test_support;

// Public exports
pub use client::{Ff1Client, PlaylistSource};
pub use config::DiscoveryConfig;
pub use discovery::{select_device, Discovery, DEFAULT_PROBE_TIMEOUT};
pub use error::{Ff1Error, Result};
pub use neighbor::{ArpScanner, CandidateSource};
pub use notification::PlayerStatusReceiver;
pub use playlist::{build_playlist, slugify, Playlist, PlaylistOptions};
pub use probe::{HttpProbe, LivenessProbe};
pub use protocol::{Command, CommandEnvelope};
pub use types::{
    DeviceDescriptor, DeviceSettings, DeviceStatus, MacInfo, PlayerStatus, PlayerStatusItem,
    DEFAULT_PORT, HOSTNAME_PREFIX,
};
pub use url_policy::UrlPolicy;
