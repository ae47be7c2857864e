//! Fetchers for the rainfall, crop production and water usage datasets

use crate::cache::ResponseCache;
use crate::transport::{HttpTransport, TransportError, TransportResponse};
use reqwest::Url;
use samarth_core::catalog::get_subdivision_for_state;
use samarth_core::config::{Endpoints, LayeredConfig};
use samarth_core::models::{
    ApiKind, CropRecord, DatasetRecords, FetchFailure, FetchResult, FetchedData, RainfallRecord,
    WaterUsageRecord,
};
use samarth_core::retry::{RetryDecision, RetryError, RetryPolicy, Sleeper, TokioSleeper};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page size for crop production requests
pub const CROP_PAGE_LIMIT: u32 = 200;

/// Fixed slice of the rainfall dataset that is fetched before filtering.
///
/// The endpoint cannot filter by subdivision or year, so a window covering the
/// recent decades is requested and filtered client-side. Years outside the
/// window are silently missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainfallWindow {
    pub offset: u32,
    pub limit: u32,
}

impl Default for RainfallWindow {
    fn default() -> Self {
        Self {
            offset: 1800,
            limit: 500,
        }
    }
}

/// Everything a fetcher needs besides the transport
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub api_key: String,
    pub endpoints: Endpoints,
    pub retry: RetryPolicy,
    pub cache_ttl: Duration,
    pub enable_caching: bool,
    pub rainfall_window: RainfallWindow,
}

impl FetcherSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            api_key: config.data_api_key.value.clone(),
            endpoints: config.endpoints.value.clone(),
            retry: config.data_retry_policy(),
            cache_ttl: config.cache_ttl(),
            enable_caching: config.enable_caching.value,
            rainfall_window: RainfallWindow::default(),
        }
    }
}

/// One page of a data.gov.in resource
#[derive(Debug, Deserialize)]
struct PortalPage {
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

/// Fetches and normalizes dataset records, with retry and caching
pub struct DataFetcher {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    settings: FetcherSettings,
    cache: ResponseCache,
}

impl DataFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: FetcherSettings) -> Self {
        let cache = if settings.enable_caching {
            ResponseCache::new(settings.cache_ttl)
        } else {
            ResponseCache::disabled()
        };

        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            settings,
            cache,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn settings(&self) -> &FetcherSettings {
        &self.settings
    }

    /// Annual rainfall for the subdivision covering `state_name`, limited to `years`
    pub async fn fetch_rainfall_annual(&self, state_name: &str, years: &[i32]) -> FetchResult {
        let cache_key = format!("fetch_rainfall_annual|{}|{}", state_name, join_years(years));
        if let Some(hit) = self.cached(&cache_key) {
            return Ok(hit);
        }

        let subdivision = get_subdivision_for_state(state_name);
        info!(state = %state_name, subdivision = %subdivision, "Fetching rainfall data");

        let window = self.settings.rainfall_window;
        let url = self.build_url(
            &self.settings.endpoints.rainfall,
            &[
                ("offset", window.offset.to_string()),
                ("limit", window.limit.to_string()),
            ],
        )?;

        let response = self.get_with_retry(&url).await?;
        let raw: Vec<RainfallRecord> = decode_records(&response.body)?;
        let total_fetched = raw.len();

        let records: Vec<RainfallRecord> = raw
            .into_iter()
            .filter(|r| r.subdivision.trim().eq_ignore_ascii_case(&subdivision))
            .filter(|r| r.year.is_some_and(|y| years.contains(&y)))
            .collect();

        info!(
            subdivision = %subdivision,
            total_fetched,
            matched = records.len(),
            "Rainfall records filtered"
        );

        let data = FetchedData {
            api_url: response.url,
            total_fetched,
            records: DatasetRecords::Rainfall {
                state: state_name.to_string(),
                subdivision,
                records,
            },
        };
        self.cache.put(cache_key, data.clone());
        Ok(data)
    }

    /// District-wise crop production for a state, optionally narrowed by crop and year
    pub async fn fetch_crop_production(
        &self,
        state_name: &str,
        crop_name: Option<&str>,
        year: Option<i32>,
    ) -> FetchResult {
        let cache_key = format!(
            "fetch_crop_production|{}|{}|{}",
            state_name,
            crop_name.unwrap_or(""),
            year.map(|y| y.to_string()).unwrap_or_default()
        );
        if let Some(hit) = self.cached(&cache_key) {
            return Ok(hit);
        }

        info!(state = %state_name, crop = ?crop_name, year = ?year, "Fetching crop data");

        let mut filters = vec![("filters[state_name]", state_name.to_string())];
        if let Some(crop) = crop_name {
            filters.push(("filters[crop]", crop.to_string()));
        }
        if let Some(year) = year {
            filters.push(("filters[crop_year]", year.to_string()));
        }
        filters.push(("limit", CROP_PAGE_LIMIT.to_string()));

        let url = self.build_url(&self.settings.endpoints.crop_production, &filters)?;
        let response = self.get_with_retry(&url).await?;
        let records: Vec<CropRecord> = decode_records(&response.body)?;

        let data = FetchedData {
            api_url: response.url,
            total_fetched: records.len(),
            records: DatasetRecords::Crops {
                state: state_name.to_string(),
                crop: crop_name.map(str::to_string),
                year,
                records,
            },
        };
        self.cache.put(cache_key, data.clone());
        Ok(data)
    }

    /// Drip versus traditional irrigation figures, optionally for one crop
    pub async fn fetch_water_usage(&self, crop_name: Option<&str>) -> FetchResult {
        let cache_key = format!("fetch_water_usage|{}", crop_name.unwrap_or(""));
        if let Some(hit) = self.cached(&cache_key) {
            return Ok(hit);
        }

        info!(crop = ?crop_name, "Fetching water usage data");

        let filters: Vec<(&str, String)> = crop_name
            .map(|crop| vec![("filters[crop]", crop.to_string())])
            .unwrap_or_default();

        let url = self.build_url(&self.settings.endpoints.water_usage, &filters)?;
        let response = self.get_with_retry(&url).await?;
        let records: Vec<WaterUsageRecord> = decode_records(&response.body)?;

        let data = FetchedData {
            api_url: response.url,
            total_fetched: records.len(),
            records: DatasetRecords::Water {
                crop: crop_name.map(str::to_string),
                records,
            },
        };
        self.cache.put(cache_key, data.clone());
        Ok(data)
    }

    /// Request a single record from a dataset endpoint, bypassing the cache.
    ///
    /// Returns the number of records in the page.
    pub async fn probe(&self, api: ApiKind) -> Result<usize, FetchFailure> {
        let endpoint = match api {
            ApiKind::Rainfall => &self.settings.endpoints.rainfall,
            ApiKind::Crops => &self.settings.endpoints.crop_production,
            ApiKind::Water => &self.settings.endpoints.water_usage,
        };
        let url = self.build_url(endpoint, &[("limit", "1".to_string())])?;
        let response = self.get_with_retry(&url).await?;
        let page = decode_page(&response.body)?;
        Ok(page.records.len())
    }

    fn cached(&self, key: &str) -> Option<FetchedData> {
        let hit = self.cache.get(key);
        if hit.is_some() {
            debug!(key = %key, "Response cache hit");
        }
        hit
    }

    /// Build `endpoint?api-key=..&format=json&<extra>` in that order
    fn build_url(&self, endpoint: &str, extra: &[(&str, String)]) -> Result<Url, FetchFailure> {
        let mut params: Vec<(&str, &str)> = vec![
            ("api-key", self.settings.api_key.as_str()),
            ("format", "json"),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.as_str())));

        Url::parse_with_params(endpoint, &params)
            .map_err(|e| FetchFailure::unexpected(format!("Invalid endpoint URL '{}': {}", endpoint, e)))
    }

    async fn get_with_retry(&self, url: &Url) -> Result<TransportResponse, FetchFailure> {
        debug!(url = %redact_api_key(url.as_str()), "GET");

        let result = self
            .settings
            .retry
            .execute_with(
                self.sleeper.as_ref(),
                || self.transport.get(url),
                |_: &TransportError, _| RetryDecision::Backoff,
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(RetryError::Exhausted { attempts, last } | RetryError::Aborted { attempts, last }) => {
                warn!(attempts, error = %last, "Data portal unreachable");
                let detail = format!("{} after {} attempts", last, attempts);
                return Err(match last {
                    TransportError::Timeout(_) => FetchFailure::timeout(detail),
                    TransportError::Request(_) => FetchFailure::unreachable(detail),
                });
            }
        };

        if !response.is_success() {
            warn!(status = response.status, url = %redact_api_key(&response.url), "Data portal error");
            return Err(FetchFailure::status(response.status));
        }

        Ok(response)
    }
}

/// Replace the value of the `api-key` query parameter with `***`
pub fn redact_api_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let value = if k == "api-key" { "***".to_string() } else { v.into_owned() };
                    (k.into_owned(), value)
                })
                .collect();
            if pairs.is_empty() {
                return parsed.to_string();
            }
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

fn decode_page(body: &str) -> Result<PortalPage, FetchFailure> {
    serde_json::from_str(body)
        .map_err(|e| FetchFailure::unexpected(format!("Malformed portal response: {}", e)))
}

/// Decode the `records` array, skipping rows that do not fit the record type
fn decode_records<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, FetchFailure> {
    let page = decode_page(body)?;
    let total = page.records.len();

    let records: Vec<T> = page
        .records
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(skipped = total - records.len(), "Some records were skipped");
    }

    Ok(records)
}

fn join_years(years: &[i32]) -> String {
    years.iter().map(|y| y.to_string()).collect::<Vec<_>>().join(",")
}
