//! Typed records returned by the data.gov.in datasets
//!
//! The portal serves most numbers as strings and uses "NA" or "" for missing
//! values, so numeric fields are parsed leniently: anything that is not a
//! number becomes `None` instead of failing the whole record.

use serde::{Deserialize, Deserializer, Serialize};

use super::query::ApiKind;

/// One row of the annual rainfall dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallRecord {
    /// Meteorological subdivision name
    #[serde(rename = "sd_name", alias = "subdivision", default)]
    pub subdivision: String,

    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,

    /// Annual rainfall in mm
    #[serde(default, deserialize_with = "lenient_f64")]
    pub annual: Option<f64>,
}

/// One row of the district-wise crop production dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    #[serde(default)]
    pub state_name: String,

    #[serde(default)]
    pub district_name: String,

    #[serde(default, deserialize_with = "lenient_year")]
    pub crop_year: Option<i32>,

    #[serde(default)]
    pub season: String,

    #[serde(default)]
    pub crop: String,

    #[serde(rename = "area_", alias = "area", default, deserialize_with = "lenient_f64")]
    pub area: Option<f64>,

    /// Production in tonnes
    #[serde(
        rename = "production_",
        alias = "production",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub production: Option<f64>,
}

/// One row of the drip-versus-traditional irrigation comparison
///
/// Values are kept as the portal's text so they can be quoted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterUsageRecord {
    #[serde(default)]
    pub crop: String,

    #[serde(rename = "traditional_method___water", default, deserialize_with = "lenient_text")]
    pub traditional_water: Option<String>,

    #[serde(
        rename = "drip_irrigation_method___water",
        default,
        deserialize_with = "lenient_text"
    )]
    pub drip_water: Option<String>,

    #[serde(rename = "_saving_in_water_", default, deserialize_with = "lenient_text")]
    pub water_saving_pct: Option<String>,

    #[serde(rename = "_increase_in_yield", default, deserialize_with = "lenient_text")]
    pub yield_increase_pct: Option<String>,
}

/// Normalized records of one fetch, tagged by dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dataset", rename_all = "lowercase")]
pub enum DatasetRecords {
    Rainfall {
        state: String,
        subdivision: String,
        records: Vec<RainfallRecord>,
    },
    Crops {
        state: String,
        crop: Option<String>,
        year: Option<i32>,
        records: Vec<CropRecord>,
    },
    Water {
        crop: Option<String>,
        records: Vec<WaterUsageRecord>,
    },
}

impl DatasetRecords {
    pub fn kind(&self) -> ApiKind {
        match self {
            DatasetRecords::Rainfall { .. } => ApiKind::Rainfall,
            DatasetRecords::Crops { .. } => ApiKind::Crops,
            DatasetRecords::Water { .. } => ApiKind::Water,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DatasetRecords::Rainfall { records, .. } => records.len(),
            DatasetRecords::Crops { records, .. } => records.len(),
            DatasetRecords::Water { records, .. } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a number from portal text ("1,234.5", " 42 ", "NA")
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_number(&s),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|v| v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v as i32))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
