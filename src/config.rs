//! Environment configuration and built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

/// Description attached to every API token this client provisions.
///
/// Authorizations carrying it are replaced on re-issue rather than
/// accumulated, so a server never holds more than one per organization.
pub const TOKEN_DESCRIPTION: &str = "telemetry-api";

/// Connection settings for a server instance.
///
/// [`Config::from_env`] reads the `INFLUXDB_*` environment variables; any
/// variable left unset falls back to the development default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server URL (e.g., "http://localhost:8086")
    pub url: String,

    /// Initial admin username
    pub username: String,

    /// Initial admin password
    pub password: String,

    /// Organization name
    pub org: String,

    /// Bucket name
    pub bucket: String,
}

impl Config {
    /// Read configuration from `INFLUXDB_URL`, `INFLUXDB_USERNAME`,
    /// `INFLUXDB_PASSWORD`, `INFLUXDB_ORG`, and `INFLUXDB_BUCKET`.
    pub fn from_env() -> Self {
        Self {
            url: env_or("INFLUXDB_URL", "http://localhost:8086"),
            username: env_or("INFLUXDB_USERNAME", "development"),
            password: env_or("INFLUXDB_PASSWORD", "development"),
            org: env_or("INFLUXDB_ORG", "development"),
            bucket: env_or("INFLUXDB_BUCKET", "development"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            username: "development".to_string(),
            password: "development".to_string(),
            org: "development".to_string(),
            bucket: "development".to_string(),
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Tags attached to every written point unless the point carries its own
/// value for the same key.
pub fn default_tags() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("hostname".to_string(), "localhost".to_string()),
        ("app".to_string(), "telemetry".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.url, "http://localhost:8086");
        assert_eq!(config.username, "development");
        assert_eq!(config.password, "development");
        assert_eq!(config.org, "development");
        assert_eq!(config.bucket, "development");
    }

    #[test]
    fn test_default_tags() {
        let tags = default_tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("hostname").map(String::as_str), Some("localhost"));
        assert_eq!(tags.get("app").map(String::as_str), Some("telemetry"));
    }

    #[test]
    fn test_token_description() {
        assert_eq!(TOKEN_DESCRIPTION, "telemetry-api");
    }
}
