pub mod dataset;
pub mod fetch;
pub mod query;

pub use dataset::{CropRecord, DatasetRecords, RainfallRecord, WaterUsageRecord};
pub use fetch::{Citation, FetchBundle, FetchErrorKind, FetchFailure, FetchResult, FetchedData};
pub use query::{ApiKind, ApiSpec, Entities, Intent, ParsedQuery, RejectionKind, ValidationResult};
