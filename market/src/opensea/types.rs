use serde::Deserialize;
use serde_json::Value;

/// Top-level GraphQL response body.
#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope {
    pub data: Option<TopCollectionsData>,

    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCollectionsData {
    pub top_collections: Option<TopCollectionsPage>,
}

/// Items stay untyped here so one malformed collection cannot fail the page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCollectionsPage {
    #[serde(default)]
    pub items: Vec<Value>,

    pub next_page_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCollection {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub floor_price: Option<RawPrice>,
    pub top_offer: Option<RawPrice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    pub price_per_item: Option<RawPricePerItem>,
}

/// Amounts arrive either as JSON numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
pub struct RawPricePerItem {
    pub usd: Option<Value>,
    pub native: Option<RawNativeAmount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNativeAmount {
    pub symbol: Option<String>,
    pub unit: Option<Value>,
}
