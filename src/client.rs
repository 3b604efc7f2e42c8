//! InfluxDB HTTP client.
//!
//! This module provides the main `Client` type for writing, querying and
//! deleting points, and for managing organizations and buckets on an
//! InfluxDB 2.x server.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::line::{Point, Tags, build_batch};
use crate::models::{
    Bucket, BucketsPage, CreateBucket, CreateOrganization, DeletePayload, Organization,
    OrganizationsPage, QueryPayload,
};
use crate::pagination::{Page, PageStream, collect_pages, paginate};
use crate::predicate::{DeleteRange, build_predicate};
use crate::table::{Row, TableReader};

const ORGS_PATH: &str = "/api/v2/orgs";
const BUCKETS_PATH: &str = "/api/v2/buckets";

/// InfluxDB 2.x client.
///
/// The client is cheap to clone; clones share one connection pool. Plain
/// HTTP or TLS is picked from the URL scheme. Every request is authenticated
/// with `Authorization: Token <token>`.
///
/// # Example
///
/// ```ignore
/// use influxdb_admin::{Client, Point, QueryBuilder};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("http://localhost:8086", "my-token")?;
///
///     let point = Point::new("temperature", 21.5, 1700000000000).tag("room", "kitchen");
///     client.write_points("my-org", "sensors", &[point]).await?;
///
///     let flux = QueryBuilder::new("sensors")
///         .measurement("temperature")
///         .range(1699999000, 1700001000)
///         .build();
///     for row in client.query("my-org", flux).await? {
///         println!("{:?}", row);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Client {
    /// Create a new InfluxDB client.
    ///
    /// # Arguments
    ///
    /// * `url` - Base URL of the InfluxDB server (e.g., "http://localhost:8086")
    /// * `token` - API token
    pub fn new(url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), url, token)
    }

    /// Create a new client with a custom reqwest client.
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_http_client(
        http: reqwest::Client,
        url: impl AsRef<str>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let url = url.as_ref();
        let base_url =
            Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full URL for an API endpoint.
    fn endpoint(&self, path: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.to_string()
    }

    /// Resolve a server-provided link (usually an absolute path).
    fn resolve(&self, link: &str) -> Result<Url> {
        self.base_url
            .join(link)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", link, e)))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "InfluxDB request");
        self.http
            .request(method, url)
            .header("Authorization", format!("Token {}", self.token))
    }

    async fn get_json<T: DeserializeOwned>(&self, link: &str) -> Result<T> {
        let url = self.resolve(link)?;
        let response = self.request(Method::GET, url.as_str()).send().await?;
        read_json(response).await
    }

    // =========================================================================
    // Organizations
    // =========================================================================

    /// Create an organization.
    pub async fn create_organization(&self, name: &str) -> Result<Organization> {
        let endpoint = self.endpoint(ORGS_PATH);
        let body = serde_json::to_string(&CreateOrganization { name })?;

        let response = self
            .request(Method::POST, &endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Stream all organizations, one page at a time.
    pub fn organizations(&self) -> PageStream<Organization> {
        let client = self.clone();
        paginate(ORGS_PATH, move |cursor| {
            let client = client.clone();
            async move {
                let page: OrganizationsPage = client.get_json(&cursor).await?;
                Ok::<_, Error>(Page::from(page))
            }
        })
    }

    /// List all organizations across every page.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        collect_pages(self.organizations()).await
    }

    /// Find an organization by name. Stops paging at the first match.
    pub async fn find_organization(&self, name: &str) -> Result<Option<Organization>> {
        let mut pages = self.organizations();
        while let Some(page) = pages.next().await {
            if let Some(org) = page?.into_iter().find(|o| o.name == name) {
                return Ok(Some(org));
            }
        }
        Ok(None)
    }

    /// Delete an organization by ID.
    pub async fn delete_organization(&self, id: &str) -> Result<()> {
        let endpoint = self.endpoint(&format!("{}/{}", ORGS_PATH, id));
        let response = self.request(Method::DELETE, &endpoint).send().await?;
        check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Buckets
    // =========================================================================

    /// Create a bucket in the organization with ID `org_id`.
    ///
    /// `shard_group_duration` is sent in whole seconds.
    pub async fn create_bucket(
        &self,
        org_id: &str,
        name: &str,
        shard_group_duration: Duration,
    ) -> Result<Bucket> {
        let endpoint = self.endpoint(BUCKETS_PATH);
        let body = serde_json::to_string(&CreateBucket {
            org_id,
            name,
            shard_group_duration,
        })?;

        let response = self
            .request(Method::POST, &endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Stream all buckets, one page at a time.
    pub fn buckets(&self) -> PageStream<Bucket> {
        let client = self.clone();
        paginate(BUCKETS_PATH, move |cursor| {
            let client = client.clone();
            async move {
                let page: BucketsPage = client.get_json(&cursor).await?;
                Ok::<_, Error>(Page::from(page))
            }
        })
    }

    /// List all buckets across every page.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        collect_pages(self.buckets()).await
    }

    /// Find a bucket by name. Stops paging at the first match.
    pub async fn find_bucket(&self, name: &str) -> Result<Option<Bucket>> {
        let mut pages = self.buckets();
        while let Some(page) = pages.next().await {
            if let Some(bucket) = page?.into_iter().find(|b| b.name == name) {
                return Ok(Some(bucket));
            }
        }
        Ok(None)
    }

    /// Delete a bucket by ID.
    pub async fn delete_bucket(&self, id: &str) -> Result<()> {
        let endpoint = self.endpoint(&format!("{}/{}", BUCKETS_PATH, id));
        let response = self.request(Method::DELETE, &endpoint).send().await?;
        check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Write a line-protocol body with millisecond precision.
    pub async fn write_lines(
        &self,
        org: &str,
        bucket: &str,
        lines: impl Into<String>,
    ) -> Result<()> {
        let endpoint = self.endpoint("/api/v2/write");

        let response = self
            .request(Method::POST, &endpoint)
            .header("Content-Type", "text/plain; charset=utf-8")
            .query(&[("org", org), ("bucket", bucket), ("precision", "ms")])
            .body(lines.into())
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Write points as one batch. An empty slice sends nothing.
    pub async fn write_points(&self, org: &str, bucket: &str, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            debug!(bucket, "no points to write");
            return Ok(());
        }
        self.write_lines(org, bucket, build_batch(points)).await
    }

    /// Execute a Flux query and return the CSV response as a stream of rows.
    ///
    /// Rows are returned as raw string cells, header rows included. A query
    /// failure the server reports inside the CSV body ends the stream with
    /// [`Error::QueryError`].
    ///
    /// # Arguments
    ///
    /// * `org` - Organization name
    /// * `query` - Flux query string, e.g. from [`QueryBuilder`](crate::QueryBuilder)
    pub async fn query_stream(
        &self,
        org: &str,
        query: impl Into<String>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Row>> + Send>>> {
        let endpoint = self.endpoint("/api/v2/query");
        let query = query.into();
        let body = serde_json::to_string(&QueryPayload::flux(&query))?;

        let response = self
            .request(Method::POST, &endpoint)
            .header("Accept", "application/csv")
            .header("Content-Type", "application/json")
            .query(&[("org", org)])
            .body(body)
            .send()
            .await?;
        let response = check(response).await?;

        // Convert the response body to an async reader
        let reader = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
        let mut table = TableReader::new(reader);

        let s = stream! {
            loop {
                match table.next().await {
                    Ok(Some(row)) => yield Ok(row),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(s))
    }

    /// Execute a Flux query and collect all rows into a Vec.
    ///
    /// **Warning**: This loads all rows into memory. For large result sets,
    /// use `query_stream()` instead.
    pub async fn query(&self, org: &str, query: impl Into<String>) -> Result<Vec<Row>> {
        let mut stream = self.query_stream(org, query).await?;
        let mut rows = Vec::new();

        while let Some(row) = stream.next().await {
            rows.push(row?);
        }

        Ok(rows)
    }

    /// Delete points of `bucket` matching a measurement and tags.
    ///
    /// With `range` set to `None` the whole storable time span is used. With
    /// no measurement and no tags the predicate is empty and every point in
    /// the range is deleted.
    pub async fn delete_data(
        &self,
        org: &str,
        bucket: &str,
        measurement: Option<&str>,
        tags: &Tags,
        range: Option<DeleteRange>,
    ) -> Result<()> {
        let endpoint = self.endpoint("/api/v2/delete");
        let payload = DeletePayload::new(
            build_predicate(measurement, tags),
            &range.unwrap_or_default(),
        );
        let body = serde_json::to_string(&payload)?;

        let response = self
            .request(Method::POST, &endpoint)
            .header("Content-Type", "application/json")
            .query(&[("org", org), ("bucket", bucket)])
            .body(body)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`Error::Status`].
///
/// The status is kept even when the error body cannot be read.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    warn!(%status, url = %url, "InfluxDB request failed");
    Err(Error::Status {
        status: status.to_string(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = check(response).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}
