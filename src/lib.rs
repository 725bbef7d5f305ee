//! Convenience client for an InfluxDB 2.x-compatible time-series database.
//!
//! Wraps the v2 admin and write HTTP APIs behind one explicit handle:
//! - liveness checks with a fixed 10 second deadline
//! - idempotent first-run onboarding
//! - cookie-session sign-in and sign-out
//! - API token provisioning with replace-on-reissue semantics
//! - float-field point construction with built-in default tags
//! - buffered line-protocol writes, flushed on close
//!
//! # Usage
//! ```no_run
//! use influx_telemetry::{point, Client, Config, SetupRequest};
//!
//! # async fn run() -> influx_telemetry::Result<()> {
//! let config = Config::from_env();
//! let client = Client::connect(config.url.as_str()).await?;
//!
//! client.setup(&SetupRequest::from_config(&config)).await?;
//! let token = client
//!     .authenticate(&config.username, &config.password, &config.org)
//!     .await?;
//!
//! let mut writer = client.writer(&config.org, &config.bucket);
//! writer.point(point(
//!     "cpu",
//!     [("usage", 64.5)],
//!     [("host", "web01")],
//!     1_700_000_000_000_000_000,
//! ));
//! writer.close().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod point;
pub mod transform;
pub mod write;

pub use api::SetupRequest;
pub use client::{Client, Connection, SetupOutcome, PING_TIMEOUT};
pub use config::{default_tags, Config, TOKEN_DESCRIPTION};
pub use error::{Operation, Result, TelemetryError};
pub use point::{point, FieldMap, Point, PointBuilder, TagMap, Timestamp};
pub use transform::split_tags_fields;
pub use write::{PointWriter, WriteSummary};
