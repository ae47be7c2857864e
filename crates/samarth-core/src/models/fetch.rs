use serde::Serialize;
use std::fmt;

use super::dataset::DatasetRecords;
use super::query::ApiKind;

/// Machine-checkable reason a dataset fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// All retries exhausted on timeouts
    ApiTimeout,
    /// The portal answered with a non-200 status
    ApiStatus,
    /// Anything else (malformed body, unexpected shape)
    Unexpected,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::ApiTimeout => "api_timeout",
            FetchErrorKind::ApiStatus => "api_status",
            FetchErrorKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch: internal kind and detail plus a message fit for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FetchErrorKind,

    /// User-facing message
    pub message: String,

    /// Internal detail for logs
    pub detail: String,

    /// HTTP status for `api_status` failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl FetchFailure {
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::ApiTimeout,
            message: "The data portal did not respond in time. Please try again in a moment."
                .to_string(),
            detail: detail.into(),
            status: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            kind: FetchErrorKind::ApiStatus,
            message: "The data portal is having trouble right now. Please try again later."
                .to_string(),
            detail: format!("API returned status {}", status),
            status: Some(status),
        }
    }

    /// Connection-level failure (DNS, refused connection) after all retries
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unexpected,
            message: "Could not reach the data portal. Check your connection and try again."
                .to_string(),
            detail: detail.into(),
            status: None,
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unexpected,
            message: "Something went wrong while reading the data portal response.".to_string(),
            detail: detail.into(),
            status: None,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for FetchFailure {}

/// A successful fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchedData {
    /// Exact outbound URL, for traceability
    pub api_url: String,

    /// Records returned by the portal before client-side filtering
    pub total_fetched: usize,

    pub records: DatasetRecords,
}

impl FetchedData {
    /// Records left after filtering
    pub fn total_matched(&self) -> usize {
        self.records.len()
    }

    pub fn kind(&self) -> ApiKind {
        self.records.kind()
    }
}

/// Outcome of one executed plan item
pub type FetchResult = Result<FetchedData, FetchFailure>;

/// Ordered mapping from synthetic keys (`rainfall_Punjab`) to fetch results
#[derive(Debug, Clone, Default)]
pub struct FetchBundle {
    entries: Vec<(String, FetchResult)>,
}

impl FetchBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, replacing any earlier result under the same key
    pub fn insert(&mut self, key: impl Into<String>, result: FetchResult) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((key, result)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FetchResult> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchResult)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &FetchedData)> {
        self.entries.iter().filter_map(|(k, r)| r.as_ref().ok().map(|d| (k.as_str(), d)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &FetchFailure)> {
        self.entries.iter().filter_map(|(k, r)| r.as_ref().err().map(|e| (k.as_str(), e)))
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Total records across successful fetches
    pub fn total_records(&self) -> usize {
        self.successes().map(|(_, d)| d.total_matched()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Traceability record shown next to an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub purpose: String,
    pub url: String,
    pub records: usize,
    pub dataset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water(url: &str) -> FetchResult {
        Ok(FetchedData {
            api_url: url.to_string(),
            total_fetched: 0,
            records: DatasetRecords::Water {
                crop: Some("Cotton".to_string()),
                records: Vec::new(),
            },
        })
    }

    #[test]
    fn test_bundle_keeps_insertion_order_and_replaces() {
        let mut bundle = FetchBundle::new();
        bundle.insert("water_Cotton", water("a"));
        bundle.insert("crops_Punjab", Err(FetchFailure::status(503)));
        bundle.insert("water_Cotton", water("b"));

        let keys: Vec<&str> = bundle.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["water_Cotton", "crops_Punjab"]);
        assert_eq!(bundle.success_count(), 1);
        assert_eq!(bundle.failure_count(), 1);

        let data = bundle.get("water_Cotton").unwrap().as_ref().unwrap();
        assert_eq!(data.api_url, "b");
    }

    #[test]
    fn test_failure_messages_differ_from_kind() {
        let failure = FetchFailure::status(500);
        assert_eq!(failure.kind, FetchErrorKind::ApiStatus);
        assert_eq!(failure.status, Some(500));
        assert!(!failure.message.contains("api_status"));
        assert_eq!(failure.to_string(), "api_status: API returned status 500");
    }

    #[test]
    fn test_unreachable_is_not_a_timeout() {
        let failure = FetchFailure::unreachable("connection refused");
        assert_eq!(failure.kind, FetchErrorKind::Unexpected);
        assert_ne!(failure.message, FetchFailure::timeout("x").message);
    }
}
