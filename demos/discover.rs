//! Discover FF1 devices and print their status.
//!
//! ```text
//! cargo run --example discover -- [device-name-or-host]
//! RUST_LOG=ff1_control=debug cargo run --example discover
//! ```

use ff1_control::{select_device, Discovery, Ff1Client, Ff1Error};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let selector = std::env::args().nth(1);

    let discovery = Discovery::from_env();
    let devices = discovery.discover(Duration::from_secs(3)).await;

    println!("{}", serde_json::to_string_pretty(&devices)?);

    let device = match select_device(&devices, selector.as_deref()) {
        Ok(device) => device,
        Err(Ff1Error::NoDevices) if selector.is_none() => {
            eprintln!("No FF1 devices found. Ensure a device is on the network or create ff1.json.");
            return Ok(());
        }
        Err(e @ Ff1Error::AmbiguousDevice(_)) => {
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("Using {} ({}:{})", device.name, device.host, device.port);
    let client = Ff1Client::from_descriptor(&device)?;
    let status = client.get_device_status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
