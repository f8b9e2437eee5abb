use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use super::parser::parse_item;
use super::types::GraphQlEnvelope;
use crate::errors::FetchError;
use crate::snapshot::ItemSnapshot;
use crate::source::PageFetcher;

pub const DEFAULT_GRAPHQL_URL: &str = "https://gql.opensea.io/graphql";

const TOP_COLLECTIONS_QUERY: &str = r#"
query TopCollections($cursor: String, $sort: TopCollectionsSort!, $filter: TopCollectionsFilter, $category: CategoryIdentifier, $limit: Int!) {
  topCollections(cursor: $cursor, sort: $sort, filter: $filter, category: $category, limit: $limit) {
    items {
      slug
      name
      floorPrice { pricePerItem { usd native { symbol unit } } }
      topOffer { pricePerItem { usd native { symbol unit } } }
    }
    nextPageCursor
  }
}
"#;

#[derive(Clone)]
pub struct OpenSeaClient {
    http: Client,
    url: String,
}

impl OpenSeaClient {
    pub fn new(url: String) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl PageFetcher for OpenSeaClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_page(
        &self,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ItemSnapshot>, FetchError> {
        let payload = json!({
            "query": TOP_COLLECTIONS_QUERY,
            "variables": {
                "sort": { "by": "ONE_DAY_VOLUME", "direction": "DESC" },
                "filter": null,
                "category": null,
                "cursor": cursor,
                "limit": limit,
            }
        });

        let resp = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let envelope: GraphQlEnvelope = resp.json().await?;

        let page = match envelope.data.and_then(|d| d.top_collections) {
            Some(page) => page,
            None => {
                let msg = envelope
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(if msg.is_empty() {
                    FetchError::InvalidResponse("missing data.topCollections".into())
                } else {
                    FetchError::GraphQl(msg)
                });
            }
        };

        debug!(
            items = page.items.len(),
            has_next = page.next_page_cursor.is_some(),
            "opensea page fetched"
        );

        Ok(page.items.into_iter().map(parse_item).collect())
    }
}
