//! Digest of fetched records and the prompts that turn it into an answer

use samarth_core::models::{CropRecord, DatasetRecords, FetchBundle, RainfallRecord, WaterUsageRecord};
use samarth_data::{average_annual_rainfall, production_by_district, top_crops_by_production};
use std::fmt::Write;

/// Crops listed per state in the digest
const TOP_CROPS: usize = 10;

/// Districts listed per crop when the question asks about districts
const TOP_DISTRICTS: usize = 3;

/// Compact text digest of every successful fetch, in bundle order
pub fn build_data_digest(question: &str, bundle: &FetchBundle) -> String {
    let wants_districts = question.to_lowercase().contains("district");
    let mut digest = String::from("AVAILABLE DATA:\n\n");

    for (_, data) in bundle.successes() {
        match &data.records {
            DatasetRecords::Rainfall { state, records, .. } => {
                write_rainfall(&mut digest, state, records);
            }
            DatasetRecords::Crops { state, records, .. } => {
                write_crops(&mut digest, state, records, wants_districts);
            }
            DatasetRecords::Water { records, .. } => {
                write_water(&mut digest, records);
            }
        }
    }

    digest
}

fn write_rainfall(out: &mut String, state: &str, records: &[RainfallRecord]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{} Rainfall Data:**", state);
    for record in records {
        let year = record.year.map(|y| y.to_string()).unwrap_or_else(|| "NA".to_string());
        let annual = record.annual.map(|mm| mm.to_string()).unwrap_or_else(|| "NA".to_string());
        let _ = writeln!(out, "  - Year {}: {} mm", year, annual);
    }
    if records.len() > 1 {
        if let Some(average) = average_annual_rainfall(records) {
            let _ = writeln!(out, "  - Average: {:.1} mm", average);
        }
    }
    out.push('\n');
}

fn write_crops(out: &mut String, state: &str, records: &[CropRecord], wants_districts: bool) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{} Crop Production Data:**", state);
    for (crop, total) in top_crops_by_production(records, TOP_CROPS) {
        let _ = writeln!(out, "  - {}: {} tonnes", crop, format_thousands(total));
        if wants_districts {
            let crop_records: Vec<CropRecord> = records
                .iter()
                .filter(|r| r.crop.trim() == crop)
                .cloned()
                .collect();
            for (district, production) in production_by_district(&crop_records, TOP_DISTRICTS) {
                let _ = writeln!(out, "    • {}: {} tonnes", district, format_thousands(production));
            }
        }
    }
    out.push('\n');
}

fn write_water(out: &mut String, records: &[WaterUsageRecord]) {
    for record in records {
        let _ = writeln!(out, "**{} Water Usage:**", record.crop);
        let _ = writeln!(out, "  - Traditional: {} mm", text_or_na(&record.traditional_water));
        let _ = writeln!(out, "  - Drip irrigation: {} mm", text_or_na(&record.drip_water));
        let _ = writeln!(out, "  - Water savings: {}%", text_or_na(&record.water_saving_pct));
        let _ = writeln!(out, "  - Yield increase: {}%", text_or_na(&record.yield_increase_pct));
        out.push('\n');
    }
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("NA")
}

/// Round to a whole number with comma thousands separators
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Prompt asking the model to answer from the digest only
pub fn build_answer_prompt(question: &str, digest: &str) -> String {
    format!(
        r#"You are an expert agricultural analyst. Answer the user's question based ONLY on the provided data.

USER QUESTION: "{question}"

{digest}

INSTRUCTIONS:
1. Answer the question directly and concisely
2. Use natural, professional language
3. Include specific numbers from the data
4. If comparing, clearly state the comparison
5. If asked for reasons/recommendations, provide 3 clear points
6. If asking about trends, describe the pattern
7. Do NOT mention "based on the data" - just answer naturally
8. Keep the answer focused and under 200 words
9. Format with markdown for readability (use bold, bullet points)

Generate a clear, direct answer:
"#
    )
}

/// Prompt for messages that are not about agriculture or climate
pub fn build_general_prompt(question: &str) -> String {
    format!(
        r#"You are SAMARTH, an assistant for Indian agriculture and climate data from data.gov.in.

USER MESSAGE: "{question}"

INSTRUCTIONS:
1. Reply briefly and politely in under 80 words
2. If the message is unrelated to agriculture or climate, say that you specialise in crop production, rainfall patterns and irrigation data for Indian states
3. Suggest one example question such as "Compare rainfall in Punjab and Haryana for 2010-2014"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use samarth_core::models::{FetchFailure, FetchedData};

    fn crop(district: &str, crop: &str, production: f64) -> CropRecord {
        CropRecord {
            state_name: "Punjab".to_string(),
            district_name: district.to_string(),
            crop_year: Some(2014),
            season: "Rabi".to_string(),
            crop: crop.to_string(),
            area: None,
            production: Some(production),
        }
    }

    fn crops_bundle() -> FetchBundle {
        let mut bundle = FetchBundle::new();
        bundle.insert(
            "crops_Punjab",
            Ok(FetchedData {
                api_url: "http://portal.test/crops".to_string(),
                total_fetched: 4,
                records: DatasetRecords::Crops {
                    state: "Punjab".to_string(),
                    crop: None,
                    year: Some(2014),
                    records: vec![
                        crop("LUDHIANA", "Wheat", 1_800_000.0),
                        crop("SANGRUR", "Wheat", 1_500_000.0),
                        crop("LUDHIANA", "Wheat", 200_000.0),
                        crop("AMRITSAR", "Rice", 900_000.0),
                    ],
                },
            }),
        );
        bundle.insert("water_Cotton", Err(FetchFailure::status(500)));
        bundle
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1234.5), "1,235");
        assert_eq!(format_thousands(3_500_000.0), "3,500,000");
        assert_eq!(format_thousands(-1200.0), "-1,200");
    }

    #[test]
    fn test_crop_digest_without_districts() {
        let digest = build_data_digest("Top crops in Punjab?", &crops_bundle());
        assert!(digest.starts_with("AVAILABLE DATA:\n\n"));
        assert!(digest.contains("**Punjab Crop Production Data:**"));
        assert!(digest.contains("  - Wheat: 3,500,000 tonnes\n  - Rice: 900,000 tonnes"));
        assert!(!digest.contains('•'));
    }

    #[test]
    fn test_crop_digest_with_districts() {
        let digest = build_data_digest("Which district grows the most wheat?", &crops_bundle());
        assert!(digest.contains("    • LUDHIANA: 2,000,000 tonnes\n    • SANGRUR: 1,500,000 tonnes"));
        assert!(digest.contains("    • AMRITSAR: 900,000 tonnes"));
    }

    #[test]
    fn test_rainfall_digest_lists_years_and_average() {
        let rain = |year: i32, annual: f64| RainfallRecord {
            subdivision: "PUNJAB".to_string(),
            year: Some(year),
            annual: Some(annual),
        };
        let mut bundle = FetchBundle::new();
        bundle.insert(
            "rainfall_Punjab",
            Ok(FetchedData {
                api_url: "http://portal.test/rainfall".to_string(),
                total_fetched: 2,
                records: DatasetRecords::Rainfall {
                    state: "Punjab".to_string(),
                    subdivision: "PUNJAB".to_string(),
                    records: vec![rain(2010, 500.0), rain(2011, 601.0)],
                },
            }),
        );

        let digest = build_data_digest("Rainfall in Punjab", &bundle);
        assert!(digest.contains(
            "**Punjab Rainfall Data:**\n  - Year 2010: 500 mm\n  - Year 2011: 601 mm\n  - Average: 550.5 mm\n"
        ));
    }

    #[test]
    fn test_water_digest() {
        let mut bundle = FetchBundle::new();
        bundle.insert(
            "water_Cotton",
            Ok(FetchedData {
                api_url: "http://portal.test/water".to_string(),
                total_fetched: 1,
                records: DatasetRecords::Water {
                    crop: Some("Cotton".to_string()),
                    records: vec![WaterUsageRecord {
                        crop: "Cotton".to_string(),
                        traditional_water: Some("856".to_string()),
                        drip_water: Some("420".to_string()),
                        water_saving_pct: Some("50.9".to_string()),
                        yield_increase_pct: None,
                    }],
                },
            }),
        );
        let digest = build_data_digest("drip irrigation for cotton", &bundle);
        assert!(digest.contains(
            "**Cotton Water Usage:**\n  - Traditional: 856 mm\n  - Drip irrigation: 420 mm\n  - Water savings: 50.9%\n  - Yield increase: NA%\n"
        ));
    }

    #[test]
    fn test_answer_prompt() {
        let prompt = build_answer_prompt("How much rain?", "AVAILABLE DATA:\n\n");
        assert!(prompt.contains("USER QUESTION: \"How much rain?\""));
        assert!(prompt.contains("under 200 words"));
        assert!(prompt.contains("9. Format with markdown"));
    }
}
