//! SAMARTH Data - fetchers for the data.gov.in datasets
//!
//! This crate defines the HTTP transport port, the three dataset fetchers,
//! the response cache and small aggregation helpers over fetched records.

pub mod cache;
pub mod fetcher;
pub mod summary;
pub mod transport;

// Re-export main types
pub use cache::ResponseCache;
pub use fetcher::{redact_api_key, DataFetcher, FetcherSettings, RainfallWindow, CROP_PAGE_LIMIT};
pub use summary::{average_annual_rainfall, production_by_district, top_crops_by_production};
pub use reqwest::Url;
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
