//! # influxdb-admin
//!
//! Async client for InfluxDB 2.x: write points, build and run Flux queries,
//! delete data by predicate, and manage organizations and buckets.
//!
//! ## Quick Start
//!
//! ```ignore
//! use influxdb_admin::{Client, Point, QueryBuilder, Tags};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:8086", "my-token")?;
//!
//!     let points = vec![
//!         Point::new("temperature", 21.5, 1700000000000).tag("room", "kitchen"),
//!         Point::new("temperature", 19.0, 1700000060000).tag("room", "hall"),
//!     ];
//!     client.write_points("my-org", "sensors", &points).await?;
//!
//!     let flux = QueryBuilder::new("sensors")
//!         .measurement("temperature")
//!         .tag("room", "kitchen")
//!         .range(1699999000, 1700001000)
//!         .count(true)
//!         .build();
//!     let rows = client.query("my-org", flux).await?;
//!     println!("{:?}", rows);
//!
//!     // Remove the kitchen series over the whole storable time span.
//!     let mut tags = Tags::new();
//!     tags.insert("room".into(), "kitchen".into());
//!     client
//!         .delete_data("my-org", "sensors", Some("temperature"), &tags, None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Escaping
//!
//! Measurements escape `,` and space; tag keys and values additionally
//! escape `=`. Double quotes are never escaped, so a tag value containing
//! `"` produces a delete predicate or Flux filter the server rejects.

pub mod client;
pub mod error;
pub mod escape;
pub mod line;
pub mod models;
pub mod pagination;
pub mod predicate;
pub mod query;
pub mod table;

// Re-export main types at crate root
pub use client::Client;
pub use error::{Error, Result};
pub use escape::{escape_measurement, escape_tag};
pub use line::{Point, Tags, build_batch, build_line};
pub use models::{Bucket, Organization};
pub use pagination::{Page, PageStream};
pub use predicate::{DeleteRange, MAX_STORABLE_NANOS, MIN_STORABLE_NANOS, build_predicate};
pub use query::QueryBuilder;
pub use table::Row;
