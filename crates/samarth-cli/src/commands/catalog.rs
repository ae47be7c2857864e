use crate::cli::{CatalogArgs, CatalogSection};
use crate::output::OutputWriter;
use crate::output_types::{CoverageRow, CropRow, StateRow, SubdivisionRow};
use anyhow::Result;
use samarth_core::catalog::{
    get_subdivision_for_state, states_for_subdivision, subdivisions_for_state, water_usage_crop, AVAILABLE_STATES,
    COMMON_CROPS, CROP_YEARS, RAINFALL_YEARS, SUBDIVISIONS, WATER_USAGE_CROPS,
};
use samarth_core::models::ApiKind;

pub fn execute(args: CatalogArgs, output: &OutputWriter) -> Result<()> {
    match args.section {
        CatalogSection::States => {
            output.section("States and Union Territories");
            output.table(state_rows())
        }
        CatalogSection::Crops => {
            output.section("Crops");
            output.table(crop_rows())
        }
        CatalogSection::Subdivisions => {
            output.section("Meteorological Subdivisions");
            output.table(subdivision_rows())
        }
        CatalogSection::Coverage => {
            output.section("Dataset Coverage");
            output.table(coverage_rows())
        }
    }
}

fn state_rows() -> Vec<StateRow> {
    AVAILABLE_STATES
        .iter()
        .map(|state| StateRow {
            state: state.to_string(),
            subdivision: get_subdivision_for_state(state),
            all_subdivisions: match subdivisions_for_state(state).join(", ") {
                joined if joined.is_empty() => "-".to_string(),
                joined => joined,
            },
        })
        .collect()
}

/// Common crops first, then water-usage crops missing from that list
fn crop_rows() -> Vec<CropRow> {
    let mut rows: Vec<CropRow> = COMMON_CROPS
        .iter()
        .map(|crop| CropRow {
            crop: crop.to_string(),
            water_usage: water_usage_crop(crop).is_some(),
        })
        .collect();

    for crop in WATER_USAGE_CROPS {
        if !rows.iter().any(|row| row.crop.eq_ignore_ascii_case(crop)) {
            rows.push(CropRow {
                crop: crop.to_string(),
                water_usage: true,
            });
        }
    }

    rows
}

fn subdivision_rows() -> Vec<SubdivisionRow> {
    SUBDIVISIONS
        .iter()
        .map(|subdivision| {
            let states = states_for_subdivision(subdivision);
            SubdivisionRow {
                subdivision: subdivision.to_string(),
                states: if states.is_empty() {
                    "-".to_string()
                } else {
                    states.join(", ")
                },
            }
        })
        .collect()
}

fn coverage_rows() -> Vec<CoverageRow> {
    vec![
        CoverageRow {
            dataset: ApiKind::Rainfall.as_str().to_string(),
            source: ApiKind::Rainfall.dataset_label().to_string(),
            years: format!("{}-{}", RAINFALL_YEARS.min, RAINFALL_YEARS.max),
            granularity: "Annual, by meteorological subdivision".to_string(),
        },
        CoverageRow {
            dataset: ApiKind::Crops.as_str().to_string(),
            source: ApiKind::Crops.dataset_label().to_string(),
            years: format!("{}-{}", CROP_YEARS.min, CROP_YEARS.max),
            granularity: "Per district, crop and season".to_string(),
        },
        CoverageRow {
            dataset: ApiKind::Water.as_str().to_string(),
            source: ApiKind::Water.dataset_label().to_string(),
            years: "-".to_string(),
            granularity: "Traditional vs drip irrigation, per crop".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_a_row() {
        let rows = state_rows();
        assert_eq!(rows.len(), AVAILABLE_STATES.len());
        let punjab = rows.iter().find(|r| r.state == "Punjab").unwrap();
        assert_eq!(punjab.subdivision, "PUNJAB");
        assert_eq!(punjab.all_subdivisions, "PUNJAB");

        let rajasthan = rows.iter().find(|r| r.state == "Rajasthan").unwrap();
        assert_eq!(rajasthan.all_subdivisions, "WEST RAJASTHAN, EAST RAJASTHAN");
    }

    #[test]
    fn test_crop_rows_cover_water_crops() {
        let rows = crop_rows();
        for crop in WATER_USAGE_CROPS {
            let row = rows.iter().find(|r| r.crop.eq_ignore_ascii_case(crop)).unwrap();
            assert!(row.water_usage);
        }
    }

    #[test]
    fn test_coverage_years() {
        let rows = coverage_rows();
        assert_eq!(rows[0].years, "1901-2017");
        assert_eq!(rows[1].years, "1997-2014");
    }
}
