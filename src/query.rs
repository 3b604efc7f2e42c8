//! Flux query builder.
//!
//! Builds a fixed-shape pipeline:
//!
//! ```text
//! from(bucket: "sensors")
//! |> range(start: 100, stop: 200)
//! |> filter(fn: (r) => r._measurement == "cpu" and r["host"] == "a")
//! |> keep(columns: ["_time", "_value"])
//! |> sort(columns: ["_time"])
//! ```
//!
//! In count mode the last stage is `count()` instead of `sort(...)`.

use crate::escape::{escape_measurement, escape_tag};
use crate::line::Tags;

/// Fluent builder for a Flux query over one bucket.
///
/// The builder performs no validation: an inverted range, a missing bucket
/// or an empty filter all render as-is and fail once the server evaluates
/// the query.
///
/// # Example
///
/// ```
/// use influxdb_admin::QueryBuilder;
///
/// let flux = QueryBuilder::new("sensors")
///     .measurement("temperature")
///     .tag("room", "kitchen")
///     .range(1700000000, 1700003600)
///     .build();
///
/// assert!(flux.starts_with("from(bucket: \"sensors\")"));
/// assert!(flux.ends_with("|> sort(columns: [\"_time\"])"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    bucket: String,
    measurement: Option<String>,
    tags: Tags,
    count: bool,
    start: Option<i64>,
    stop: Option<i64>,
}

impl QueryBuilder {
    /// Create a builder reading from `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Set the bucket name.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Filter on `_measurement`.
    #[must_use]
    pub fn measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }

    /// Replace the tag filter.
    #[must_use]
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Add one tag equality to the filter.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Count points instead of returning them sorted by time.
    #[must_use]
    pub fn count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// Range start in Unix seconds.
    #[must_use]
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Range stop in Unix seconds.
    #[must_use]
    pub fn stop(mut self, stop: i64) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set both range bounds in Unix seconds.
    #[must_use]
    pub fn range(self, start: i64, stop: i64) -> Self {
        self.start(start).stop(stop)
    }

    /// Render the Flux query.
    pub fn build(&self) -> String {
        let last = if self.count {
            "count()"
        } else {
            "sort(columns: [\"_time\"])"
        };

        let query = format!(
            r#"
            from(bucket: "{bucket}")
              |> range({range})
              |> filter(fn: (r) => {filter})
              |> keep(columns: ["_time", "_value"])
              |> {last}
            "#,
            bucket = self.bucket,
            range = self.range_clause(),
            filter = self.filter_expression(),
            last = last,
        );

        query
            .trim()
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn filter_expression(&self) -> String {
        let mut clauses = Vec::with_capacity(self.tags.len() + 1);
        if let Some(measurement) = &self.measurement {
            clauses.push(format!(
                "r._measurement == \"{}\"",
                escape_measurement(measurement)
            ));
        }
        for (key, value) in &self.tags {
            clauses.push(format!(
                "r[\"{}\"] == \"{}\"",
                escape_tag(key),
                escape_tag(value)
            ));
        }
        clauses.join(" and ")
    }

    fn range_clause(&self) -> String {
        let bounds: Vec<String> = [("start", self.start), ("stop", self.stop)]
            .into_iter()
            .filter_map(|(name, bound)| bound.map(|b| format!("{}: {}", name, b)))
            .collect();
        bounds.join(", ")
    }
}
