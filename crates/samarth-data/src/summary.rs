//! Aggregations over fetched records

use samarth_core::models::{CropRecord, RainfallRecord};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Mean annual rainfall over the records that carry a numeric value
pub fn average_annual_rainfall(records: &[RainfallRecord]) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.annual).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Total production per crop, largest first, limited to `n` crops.
///
/// Records without a numeric production value are skipped.
pub fn top_crops_by_production(records: &[CropRecord], n: usize) -> Vec<(String, f64)> {
    let mut totals = sum_by(records, |r| r.crop.trim());
    totals.truncate(n);
    totals
}

/// Total production per district, largest first, limited to `n` districts
pub fn production_by_district(records: &[CropRecord], n: usize) -> Vec<(String, f64)> {
    let mut totals = sum_by(records, |r| r.district_name.trim());
    totals.truncate(n);
    totals
}

fn sum_by<'a, F>(records: &'a [CropRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&'a CropRecord) -> &'a str,
{
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for record in records {
        let Some(production) = record.production else {
            continue;
        };
        let name = key(record);
        let name = if name.is_empty() { "Unknown" } else { name };
        if !totals.contains_key(name) {
            order.push(name);
        }
        *totals.entry(name).or_insert(0.0) += production;
    }

    let mut sorted: Vec<(String, f64)> = order
        .into_iter()
        .map(|name| (name.to_string(), totals[name]))
        .collect();
    // Stable sort keeps first-seen order for ties
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    sorted
}
