//! OpenSea GraphQL "top collections" listing.

pub mod client;
pub mod cursors;
pub mod parser;
pub mod types;

pub use client::OpenSeaClient;
pub use cursors::{load_cursors, parse_cursors};
