//! End-to-end bootstrap flow against a local server.
//!
//! Brings a fresh instance to a usable state: onboards it, provisions an
//! API token, reconnects with that token, and writes one sample gpu point.
//!
//! ```bash
//! INFLUXDB_URL=http://localhost:8086 cargo run --example bootstrap
//! ```

use anyhow::Result;
use influx_telemetry::{point, Client, Config, Connection, SetupOutcome, SetupRequest};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    // Admin session: onboard the server and provision an API token
    let admin = Client::connect(config.url.as_str()).await?;
    match admin.setup(&SetupRequest::from_config(&config)).await? {
        SetupOutcome::Completed => info!("onboarding completed"),
        SetupOutcome::AlreadySetUp => info!("already onboarded"),
    }
    let token = admin
        .authenticate(&config.username, &config.password, &config.org)
        .await?;

    // Everything after bootstrap runs on the token, not the password
    let client = Client::connect(Connection::new(&config.url).with_token(&token)).await?;

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as i64;
    let sample = point(
        "gpu",
        [
            ("temperature", 100.0),
            ("fan", 50.0),
            ("memory", 100.0),
            ("power", 100.0),
            ("utilization", 100.0),
            ("core", 100.0),
        ],
        [("gpu", "nvidia"), ("host", "localhost")],
        timestamp,
    );

    let mut writer = client.writer(&config.org, &config.bucket);
    writer.point(sample);
    let summary = writer.close().await?;
    info!(points = summary.points_written, bytes = summary.bytes_sent, "sample written");

    admin.signout().await?;
    Ok(())
}
