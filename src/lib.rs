pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod normalizer;
pub mod quote;
pub mod snapshot;
pub mod spend;
pub mod store;

pub use cache::RateCache;
pub use error::{FetchError, RateError};
pub use snapshot::{CachedRates, Freshness, RateSnapshot};
