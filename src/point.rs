//! Point construction and line-protocol rendering.

use crate::config::default_tags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nanosecond-precision Unix epoch timestamp
pub type Timestamp = i64;

/// Tag set with deterministic key order
pub type TagMap = BTreeMap<String, String>;

/// Field set with deterministic key order; field values are always floats
pub type FieldMap = BTreeMap<String, f64>;

/// A single measurement record.
///
/// Immutable once built: change of mind means building a new point. Sorted
/// map storage makes the rendered line protocol deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The measurement name (like a table name)
    pub measurement: String,
    /// Timestamp in nanoseconds since Unix epoch
    pub timestamp: Timestamp,
    /// Tags for series identification
    pub tags: TagMap,
    /// Field values, floats only
    pub fields: FieldMap,
}

/// Build a point with the default tags merged in.
///
/// Every field value becomes an `f64`. The default tag set is merged with
/// `tags`; an explicit tag wins over a default with the same key. The
/// timestamp is attached verbatim.
pub fn point<K, V, T, U>(
    measurement: impl Into<String>,
    fields: impl IntoIterator<Item = (K, V)>,
    tags: impl IntoIterator<Item = (T, U)>,
    timestamp: Timestamp,
) -> Point
where
    K: Into<String>,
    V: Into<f64>,
    T: Into<String>,
    U: Into<String>,
{
    let mut merged = default_tags();
    for (key, value) in tags {
        merged.insert(key.into(), value.into());
    }

    Point {
        measurement: measurement.into(),
        timestamp,
        tags: merged,
        fields: fields
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect(),
    }
}

impl Point {
    /// Create a new point builder
    pub fn builder(measurement: impl Into<String>) -> PointBuilder {
        PointBuilder::new(measurement)
    }

    /// Render as one line of line protocol:
    /// `measurement,tag=value field=value timestamp`.
    ///
    /// Unsuffixed numeric field values are floats on the wire, so `64.0`
    /// renders as `64` and still parses as a float server-side.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_tag_key(key));
            line.push('=');
            line.push_str(&escape_tag_value(value));
        }

        line.push(' ');
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", escape_field_key(key), value))
            .collect();
        line.push_str(&fields.join(","));

        line.push(' ');
        line.push_str(&self.timestamp.to_string());

        line
    }
}

/// Builder for constructing Points
pub struct PointBuilder {
    measurement: String,
    timestamp: Option<Timestamp>,
    tags: TagMap,
    fields: FieldMap,
}

impl PointBuilder {
    /// Create a new point builder
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            timestamp: None,
            tags: TagMap::new(),
            fields: FieldMap::new(),
        }
    }

    /// Set the timestamp
    pub fn timestamp(mut self, ts: Timestamp) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Build the point. The timestamp defaults to now when unset.
    ///
    /// Unlike [`point`], the builder attaches no default tags; the write
    /// facade fills those in for any point that lacks them.
    pub fn build(self) -> Point {
        Point {
            measurement: self.measurement,
            timestamp: self.timestamp.unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos() as i64
            }),
            tags: self.tags,
            fields: self.fields,
        }
    }
}

/// Escape special characters in measurement names
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape special characters in tag keys
fn escape_tag_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Escape special characters in tag values
fn escape_tag_value(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Escape special characters in field keys
fn escape_field_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_merges_default_tags() {
        let p = point(
            "gpu",
            [("temperature", 60.0), ("fan", 0.0)],
            [("gpu", "nvidia")],
            1_700_000_000_000_000_000,
        );

        assert_eq!(p.measurement, "gpu");
        assert_eq!(p.timestamp, 1_700_000_000_000_000_000);
        assert_eq!(p.fields.len(), 2);
        assert_eq!(p.fields.get("temperature"), Some(&60.0));

        // Default tags plus the explicit one
        assert_eq!(p.tags.len(), 3);
        assert_eq!(p.tags.get("hostname").map(String::as_str), Some("localhost"));
        assert_eq!(p.tags.get("app").map(String::as_str), Some("telemetry"));
        assert_eq!(p.tags.get("gpu").map(String::as_str), Some("nvidia"));
    }

    #[test]
    fn test_explicit_tag_wins_over_default() {
        let p = point(
            "cpu",
            [("usage", 12.5)],
            [("hostname", "gpu-rig")],
            42,
        );

        assert_eq!(p.tags.get("hostname").map(String::as_str), Some("gpu-rig"));
        assert_eq!(p.tags.get("app").map(String::as_str), Some("telemetry"));
    }

    #[test]
    fn test_timestamp_attached_verbatim() {
        let past = point("m", [("v", 1.0)], [("t", "x")], -5);
        assert_eq!(past.timestamp, -5);

        let zero = point("m", [("v", 1.0)], [("t", "x")], 0);
        assert_eq!(zero.timestamp, 0);
    }

    #[test]
    fn test_point_builder() {
        let p = Point::builder("cpu")
            .timestamp(1609459200000000000)
            .tag("host", "server01")
            .field("usage", 64.5)
            .build();

        assert_eq!(p.measurement, "cpu");
        assert_eq!(p.timestamp, 1609459200000000000);
        assert_eq!(p.tags.len(), 1);
        assert_eq!(p.fields.len(), 1);
    }

    #[test]
    fn test_builder_timestamp_defaults_to_now() {
        let before = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as i64;
        let p = Point::builder("cpu").field("usage", 1.0).build();
        assert!(p.timestamp >= before);
    }

    #[test]
    fn test_to_line_protocol() {
        let line = Point::builder("cpu")
            .timestamp(1609459200000000000)
            .tag("host", "server01")
            .field("usage", 64.5)
            .build()
            .to_line_protocol();

        assert_eq!(line, "cpu,host=server01 usage=64.5 1609459200000000000");
    }

    #[test]
    fn test_line_protocol_tag_and_field_order_is_sorted() {
        let line = Point::builder("system")
            .timestamp(1000000000)
            .tag("zone", "a")
            .tag("host", "h1")
            .field("mem", 8192.0)
            .field("cpu", 45.0)
            .build()
            .to_line_protocol();

        assert_eq!(line, "system,host=h1,zone=a cpu=45,mem=8192 1000000000");
    }

    #[test]
    fn test_whole_number_fields_render_unsuffixed() {
        let line = Point::builder("m")
            .timestamp(1)
            .field("v", 100.0)
            .build()
            .to_line_protocol();

        assert_eq!(line, "m v=100 1");
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_tag_key("host,name"), "host\\,name");
        assert_eq!(escape_tag_value("us west"), "us\\ west");
        assert_eq!(escape_field_key("a=b"), "a\\=b");
        assert_eq!(escape_measurement("disk usage"), "disk\\ usage");

        let line = Point::builder("net ops")
            .timestamp(7)
            .tag("region", "us west")
            .field("in,out", 1.5)
            .build()
            .to_line_protocol();

        assert_eq!(line, "net\\ ops,region=us\\ west in\\,out=1.5 7");
    }
}
