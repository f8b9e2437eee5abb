//! Data source seam used by the monitor scheduler.
//!
//! The scheduler only knows [`DataSource::fetch`]. [`PagedDataSource`] turns a
//! per-page fetcher into a depth-aware source: pages are requested with a
//! fixed concurrency ceiling, a failed page degrades to an empty page, and the
//! result is a single deduplicated [`SnapshotSet`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::errors::FetchError;
use crate::snapshot::{ItemSnapshot, SnapshotSet};

#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Fetch the first `depth` pages of candidates.
    async fn fetch(&self, depth: usize) -> Result<SnapshotSet, FetchError>;
}

/// Fetches and maps a single page of the external listing.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    async fn fetch_page(
        &self,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ItemSnapshot>, FetchError>;
}

pub struct PagedDataSource<P> {
    fetcher: Arc<P>,

    /// Cursor per page; page 1 is always requested without one.
    cursors: Vec<Option<String>>,

    page_size: usize,

    /// Upper bound on page requests in flight at once.
    concurrency: usize,
}

impl<P: PageFetcher> PagedDataSource<P> {
    /// `page_cursors` are the cursors of pages 2, 3, ... in order.
    pub fn new(
        fetcher: Arc<P>,
        page_cursors: Vec<String>,
        page_size: usize,
        concurrency: usize,
    ) -> Self {
        let mut cursors = Vec::with_capacity(page_cursors.len() + 1);
        cursors.push(None);
        cursors.extend(page_cursors.into_iter().map(Some));

        Self {
            fetcher,
            cursors,
            page_size: page_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Number of pages that can be addressed with the known cursors.
    pub fn available_pages(&self) -> usize {
        self.cursors.len()
    }
}

#[async_trait]
impl<P: PageFetcher> DataSource for PagedDataSource<P> {
    #[instrument(skip(self), target = "source", fields(available = self.cursors.len()))]
    async fn fetch(&self, depth: usize) -> Result<SnapshotSet, FetchError> {
        let depth = depth.clamp(1, self.cursors.len());

        let page_size = self.page_size;
        let pages: Vec<Option<Vec<ItemSnapshot>>> =
            stream::iter(self.cursors.iter().take(depth).cloned().enumerate())
                .map(|(idx, cursor)| {
                    let fetcher = Arc::clone(&self.fetcher);
                    async move {
                        let page = idx + 1;
                        match fetcher.fetch_page(cursor.as_deref(), page_size).await {
                            Ok(items) => {
                                debug!(page, items = items.len(), "page fetched");
                                Some(items)
                            }
                            Err(e) => {
                                warn!(page, error = %e, "page fetch failed; treating page as empty");
                                None
                            }
                        }
                    }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let failed = pages.iter().filter(|p| p.is_none()).count();
        if failed == pages.len() {
            return Err(FetchError::AllPagesFailed { pages: failed });
        }

        let set = SnapshotSet::from_pages(pages.into_iter().map(Option::unwrap_or_default).collect());
        debug!(depth, failed, items = set.len(), "fetch complete");
        Ok(set)
    }
}
