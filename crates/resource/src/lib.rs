//! Image sources for the report print pipeline.
//!
//! Raw image references from a snapshot are classified and resolved against
//! the right origin ([`SourceResolver`]), remote images are fetched and
//! rewritten into data URIs ([`Inliner`]), and every image on the prepared
//! pages is decoded before capture ([`await_images`]).
//!
//! ## Fetchers
//!
//! - [`HttpFetcher`]: credentialed, uncached HTTP via reqwest
//! - [`FilesystemFetcher`]: serves page-origin assets from a local directory
//! - [`RoutedFetcher`]: dispatches by URL prefix
//! - [`InMemoryFetcher`]: canned responses, re-exported from fieldreport-traits

use thiserror::Error;

pub mod data_uri;
mod decode;
mod filesystem;
mod http;
mod inline;
mod origin;
mod resolve;
mod router;

pub use decode::{await_images, DecodedImages, ImageStatus};
pub use filesystem::FilesystemFetcher;
pub use http::{HttpFetcher, HttpFetcherOptions};
pub use inline::{InlineReport, Inliner, InlinedPages, DEFAULT_FETCH_TIMEOUT};
pub use origin::{MediaOrigins, FALLBACK_MEDIA_ORIGIN};
pub use resolve::{classify, SourceKind, SourceResolver, DEFAULT_LOCAL_ASSET_PREFIXES};
pub use router::RoutedFetcher;

pub use fieldreport_traits::{FetchError, FetchedMedia, InMemoryFetcher, MediaFetcher};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Failed to decode image '{src}': {message}")]
    Decode { src: String, message: String },

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Image decode task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
