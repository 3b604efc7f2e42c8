//! Cursor-based pagination for listing endpoints.
//!
//! InfluxDB list responses carry a `links.next` path pointing at the next
//! page. [`paginate`] turns a page-fetching function into a lazy stream that
//! follows those links until one is missing.

use std::future::Future;
use std::pin::Pin;

use async_stream::stream;
use futures::{Stream, StreamExt};

use crate::error::Result;

/// Boxed stream of pages.
pub type PageStream<T> = Pin<Box<dyn Stream<Item = Result<Vec<T>>> + Send>>;

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Cursor of the following page, if any.
    pub next: Option<String>,
}

/// Stream pages starting at `first`, calling `fetch` with each cursor.
///
/// Nothing is fetched until the stream is polled. The stream ends after the
/// first page without a `next` cursor (an empty cursor counts as missing) or
/// after yielding the first error. Calling `paginate` again starts over from
/// `first`.
pub fn paginate<T, F, Fut>(first: impl Into<String>, mut fetch: F) -> PageStream<T>
where
    T: Send + 'static,
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<T>>> + Send + 'static,
{
    let first = first.into();
    let s = stream! {
        let mut cursor = Some(first);
        while let Some(current) = cursor.take() {
            match fetch(current).await {
                Ok(page) => {
                    cursor = page.next.filter(|next| !next.is_empty());
                    yield Ok(page.items);
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };

    Box::pin(s)
}

/// Drain a page stream, concatenating items in page order.
pub async fn collect_pages<T>(mut pages: PageStream<T>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(page) = pages.next().await {
        items.extend(page?);
    }
    Ok(items)
}
