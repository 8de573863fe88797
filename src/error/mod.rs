use crate::models::MediaKind;
use thiserror::Error;

/// Errors raised while talking to the catalog provider.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("TMDB token is not a valid header value")]
    InvalidToken,

    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Listing '{listing}' is not available for {kind}")]
    UnsupportedListing { listing: String, kind: MediaKind },
}

/// Errors raised by the document store.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Rating {0} is outside the allowed range 1..=5")]
    RatingOutOfRange(u8),

    #[error("User id must not be empty")]
    MissingUser,
}

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type StoreResult<T> = Result<T, StoreError>;
