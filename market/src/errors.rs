use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graphql error: {0}")]
    GraphQl(String),

    #[error("invalid response from data source: {0}")]
    InvalidResponse(String),

    #[error("all {pages} page fetches failed")]
    AllPagesFailed { pages: usize },
}
