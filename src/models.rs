//! JSON request and response bodies for the management endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

use crate::pagination::Page;
use crate::predicate::DeleteRange;

/// An InfluxDB organization.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Organization {
    /// Organization ID.
    pub id: String,
    /// Organization name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// An InfluxDB bucket.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Bucket {
    /// Bucket ID.
    pub id: String,
    /// Bucket name.
    pub name: String,
    /// ID of the owning organization.
    #[serde(rename = "orgID")]
    pub org_id: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// `links` object of a paged listing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// Response of `GET /api/v2/orgs`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationsPage {
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub orgs: Vec<Organization>,
}

impl From<OrganizationsPage> for Page<Organization> {
    fn from(page: OrganizationsPage) -> Self {
        Page {
            items: page.orgs,
            next: page.links.next,
        }
    }
}

/// Response of `GET /api/v2/buckets`.
#[derive(Debug, Deserialize)]
pub(crate) struct BucketsPage {
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl From<BucketsPage> for Page<Bucket> {
    fn from(page: BucketsPage) -> Self {
        Page {
            items: page.buckets,
            next: page.links.next,
        }
    }
}

/// Body of `POST /api/v2/orgs`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateOrganization<'a> {
    pub name: &'a str,
}

/// Body of `POST /api/v2/buckets`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateBucket<'a> {
    #[serde(rename = "orgID")]
    pub org_id: &'a str,
    pub name: &'a str,
    #[serde(rename = "shardGroupDuration", serialize_with = "as_seconds")]
    pub shard_group_duration: Duration,
}

/// Body of `POST /api/v2/query`.
#[derive(Debug, Serialize)]
pub(crate) struct QueryPayload<'a> {
    pub query: &'a str,
    #[serde(rename = "type")]
    pub query_type: &'static str,
}

impl<'a> QueryPayload<'a> {
    pub fn flux(query: &'a str) -> Self {
        Self {
            query,
            query_type: "flux",
        }
    }
}

/// Body of `POST /api/v2/delete`.
#[derive(Debug, Serialize)]
pub(crate) struct DeletePayload {
    pub predicate: String,
    pub start: String,
    pub stop: String,
}

impl DeletePayload {
    pub fn new(predicate: String, range: &DeleteRange) -> Self {
        Self {
            predicate,
            start: range.start_rfc3339(),
            stop: range.stop_rfc3339(),
        }
    }
}

fn as_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}
