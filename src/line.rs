//! Line protocol serialization for single-field numeric points.
//!
//! Every point is written with one field named `value` and a millisecond
//! timestamp, matching the `precision=ms` flag the client always sends.

use std::collections::BTreeMap;
use std::fmt;

use crate::escape::{escape_measurement, escape_tag};

/// Tag key to tag value mapping. Tags are emitted in key order.
pub type Tags = BTreeMap<String, String>;

/// Serialize one point as a line of line protocol.
///
/// The output has the shape
/// `<measurement>[,<key>=<value>]* value=<value> <timestamp_ms>`.
/// `value` uses the default `f64` formatting, so `42.0` is written as `42`.
/// NaN and infinities are not rejected.
pub fn build_line(measurement: &str, tags: &Tags, value: f64, timestamp_ms: i64) -> String {
    let mut line = escape_measurement(measurement);
    for (key, tag_value) in tags {
        line.push(',');
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&escape_tag(tag_value));
    }
    line.push_str(&format!(" value={} {}", value, timestamp_ms));
    line
}

/// Join the lines of several points into one write body.
pub fn build_batch<'a>(points: impl IntoIterator<Item = &'a Point>) -> String {
    points
        .into_iter()
        .map(Point::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A timestamped numeric measurement.
///
/// # Example
///
/// ```
/// use influxdb_admin::Point;
///
/// let point = Point::new("cpu", 0.64, 1700000000000).tag("host", "web 1");
/// assert_eq!(point.to_line(), "cpu,host=web\\ 1 value=0.64 1700000000000");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// Measurement name (unescaped).
    pub measurement: String,
    /// Tag set (unescaped).
    pub tags: Tags,
    /// Field value.
    pub value: f64,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
}

impl Point {
    /// Create a point without tags.
    pub fn new(measurement: impl Into<String>, value: f64, timestamp_ms: i64) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Tags::new(),
            value,
            timestamp_ms,
        }
    }

    /// Add or replace a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Serialize this point as a line of line protocol.
    pub fn to_line(&self) -> String {
        build_line(&self.measurement, &self.tags, self.value, self.timestamp_ms)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_line_escapes_measurement_and_tags() {
        let line = build_line("cpu,util", &tags(&[("host", "a b")]), 42.0, 1000);
        assert_eq!(line, "cpu\\,util,host=a\\ b value=42 1000");
    }

    #[test]
    fn test_build_line_without_tags() {
        assert_eq!(build_line("mem", &Tags::new(), 1.5, 7), "mem value=1.5 7");
    }

    #[test]
    fn test_build_line_tags_in_key_order() {
        let line = build_line("m", &tags(&[("zone", "z"), ("app", "a=b")]), -3.25, 0);
        assert_eq!(line, "m,app=a\\=b,zone=z value=-3.25 0");
    }

    #[test]
    fn test_build_line_does_not_validate_value() {
        assert_eq!(build_line("m", &Tags::new(), f64::NAN, 1), "m value=NaN 1");
    }

    #[test]
    fn test_point_display_matches_line() {
        let point = Point::new("temp", 21.5, 1700000000000).tag("room", "2,A");
        assert_eq!(point.to_string(), "temp,room=2\\,A value=21.5 1700000000000");
        assert_eq!(point.to_string(), point.to_line());
    }

    #[test]
    fn test_build_batch_joins_with_newlines() {
        let points = vec![
            Point::new("a", 1.0, 1),
            Point::new("b", 2.0, 2).tag("t", "x"),
        ];
        assert_eq!(build_batch(&points), "a value=1 1\nb,t=x value=2 2");
        assert_eq!(build_batch(&Vec::<Point>::new()), "");
    }
}
