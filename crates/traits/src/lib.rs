pub mod fetch;
pub mod platform;

pub use fetch::{FetchError, FetchedMedia, InMemoryFetcher, MediaFetcher, SharedBytes};
pub use platform::{PlatformError, PortalDocument, PrintPlatform, PrintSignal};
