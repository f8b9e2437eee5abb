//! Marketplace side of the deal monitor: what one poll cycle knows about the
//! candidate collections, and how it is fetched.

pub mod errors;
pub mod opensea;
pub mod snapshot;
pub mod source;

pub use errors::FetchError;
pub use snapshot::{ItemSnapshot, SnapshotSet, spread_percent};
pub use source::{DataSource, PageFetcher, PagedDataSource};
