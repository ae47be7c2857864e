//! Static metadata catalog for the three data.gov.in datasets
//!
//! The catalog is read-only process-wide data: the states known to the crop
//! production dataset, their common aliases, the crop lists, the year coverage
//! of each dataset and the mapping between meteorological subdivisions (the
//! unit the rainfall dataset reports in) and states.

use serde::Serialize;

/// Inclusive range of years covered by a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// Years covered by the crop production dataset
pub const CROP_YEARS: YearRange = YearRange::new(1997, 2014);

/// Years covered by the annual rainfall dataset
pub const RAINFALL_YEARS: YearRange = YearRange::new(1901, 2017);

/// All 36 meteorological subdivisions reported by the rainfall dataset
pub const SUBDIVISIONS: &[&str] = &[
    "ANDAMAN & NICOBAR ISLANDS",
    "ARUNACHAL PRADESH",
    "ASSAM & MEGHALAYA",
    "NAGALAND, MANIPUR, MIZORAM,TRIPURA",
    "SUB-HIMALAYAN W BENGAL & SIKKIM",
    "GANGETIC WEST BENGAL",
    "ORISSA",
    "JHARKHAND",
    "BIHAR",
    "EAST UTTAR PRADESH",
    "WEST UTTAR PRADESH",
    "UTTARANCHAL",
    "HARYANA, DELHI & CHANDIGARH",
    "PUNJAB",
    "HIMACHAL PRADESH",
    "JAMMU & KASHMIR",
    "WEST RAJASTHAN",
    "EAST RAJASTHAN",
    "WEST MADHYA PRADESH",
    "EAST MADHYA PRADESH",
    "GUJARAT REGION, DADRA & NAGAR HAVELI",
    "SAURASHTRA KUTCH & DIU",
    "KOKAN & GOA",
    "MADHYA MAHARASHTRA",
    "MARATWADA",
    "VIDARBHA",
    "CHATTISGARH",
    "COSTAL ANDHRA PRADESH",
    "TELENGANA",
    "RAYALSEEMA",
    "TAMIL NADU & PONDICHERRY",
    "COASTAL KARNATAKA",
    "NORTH INTERIOR KARNATAKA",
    "SOUTH INTERIOR KARNATAKA",
    "KERALA",
    "LAKSHADWEEP",
];

/// Canonical state names used by the crop production dataset
pub const AVAILABLE_STATES: &[&str] = &[
    "Andaman and Nicobar Islands",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Chhattisgarh",
    "Dadra and Nagar Haveli",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jammu and Kashmir",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Puducherry",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Abbreviations, alternative spellings and old names (many-to-one)
pub const STATE_ALIASES: &[(&str, &str)] = &[
    // Abbreviations
    ("UP", "Uttar Pradesh"),
    ("MP", "Madhya Pradesh"),
    ("HP", "Himachal Pradesh"),
    ("AP", "Andhra Pradesh"),
    ("TN", "Tamil Nadu"),
    ("WB", "West Bengal"),
    ("J&K", "Jammu and Kashmir"),
    ("JK", "Jammu and Kashmir"),
    // Alternative spellings
    ("Orissa", "Odisha"),
    ("Pondicherry", "Puducherry"),
    ("Uttaranchal", "Uttarakhand"),
    ("Chattisgarh", "Chhattisgarh"),
    ("Jammu Kashmir", "Jammu and Kashmir"),
    ("Andaman & Nicobar Islands", "Andaman and Nicobar Islands"),
    // Old names
    ("Bombay", "Maharashtra"),
    ("Madras", "Tamil Nadu"),
    ("Calcutta", "West Bengal"),
    ("Bangalore", "Karnataka"),
];

/// Common crops named in the crop production dataset (a partial list)
pub const COMMON_CROPS: &[&str] = &[
    "Wheat",
    "Rice",
    "Maize",
    "Bajra",
    "Jowar",
    "Arhar/Tur",
    "Gram",
    "Moong(Green Gram)",
    "Urad",
    "Masoor",
    "Cotton(lint)",
    "Sugarcane",
    "Groundnut",
    "Rapeseed &Mustard",
    "Sunflower",
    "Soyabean",
    "Sesamum",
    "Safflower",
];

/// The only crops present in the water usage dataset
pub const WATER_USAGE_CROPS: &[&str] = &[
    "Banana",
    "Grapes",
    "Citrus",
    "Tomato",
    "Brinjal",
    "Chilli",
    "Sugarcane",
    "Cotton",
];

/// Subdivision to state mapping (many-to-many).
///
/// Order matters: a state covered by several subdivisions maps to the first
/// one listed here.
pub const SUBDIVISION_STATES: &[(&str, &[&str])] = &[
    ("PUNJAB", &["Punjab"]),
    ("HARYANA, DELHI & CHANDIGARH", &["Haryana", "Delhi", "Chandigarh"]),
    ("UTTARANCHAL", &["Uttarakhand"]),
    ("EAST UTTAR PRADESH", &["Uttar Pradesh"]),
    ("WEST UTTAR PRADESH", &["Uttar Pradesh"]),
    ("ORISSA", &["Odisha"]),
    ("JHARKHAND", &["Jharkhand"]),
    ("BIHAR", &["Bihar"]),
    ("ASSAM & MEGHALAYA", &["Assam", "Meghalaya"]),
    ("NAGALAND, MANIPUR, MIZORAM,TRIPURA", &["Nagaland", "Manipur", "Mizoram", "Tripura"]),
    ("SUB-HIMALAYAN W BENGAL & SIKKIM", &["West Bengal", "Sikkim"]),
    ("GANGETIC WEST BENGAL", &["West Bengal"]),
    ("ANDAMAN & NICOBAR ISLANDS", &["Andaman and Nicobar Islands"]),
    ("ARUNACHAL PRADESH", &["Arunachal Pradesh"]),
    ("HIMACHAL PRADESH", &["Himachal Pradesh"]),
    ("JAMMU & KASHMIR", &["Jammu and Kashmir"]),
    ("WEST RAJASTHAN", &["Rajasthan"]),
    ("EAST RAJASTHAN", &["Rajasthan"]),
    ("WEST MADHYA PRADESH", &["Madhya Pradesh"]),
    ("EAST MADHYA PRADESH", &["Madhya Pradesh"]),
    ("GUJARAT REGION, DADRA & NAGAR HAVELI", &["Gujarat", "Dadra and Nagar Haveli"]),
    ("SAURASHTRA KUTCH & DIU", &["Gujarat", "Daman and Diu"]),
    ("KOKAN & GOA", &["Maharashtra", "Goa"]),
    ("MADHYA MAHARASHTRA", &["Maharashtra"]),
    ("MARATWADA", &["Maharashtra"]),
    ("VIDARBHA", &["Maharashtra"]),
    ("CHATTISGARH", &["Chhattisgarh"]),
    ("COSTAL ANDHRA PRADESH", &["Andhra Pradesh"]),
    ("TELENGANA", &["Telangana"]),
    ("RAYALSEEMA", &["Andhra Pradesh"]),
    ("TAMIL NADU & PONDICHERRY", &["Tamil Nadu", "Puducherry"]),
    ("COASTAL KARNATAKA", &["Karnataka"]),
    ("NORTH INTERIOR KARNATAKA", &["Karnataka"]),
    ("SOUTH INTERIOR KARNATAKA", &["Karnataka"]),
    ("KERALA", &["Kerala"]),
    ("LAKSHADWEEP", &["Lakshadweep"]),
];

/// Normalize a state name using the alias table.
///
/// Tries an exact canonical match, then a case-insensitive alias match, then a
/// case-insensitive canonical match. Unknown names are returned unchanged.
pub fn normalize_state_name(state_name: &str) -> String {
    let trimmed = state_name.trim();

    if let Some(state) = AVAILABLE_STATES.iter().find(|s| **s == trimmed) {
        return state.to_string();
    }

    let lower = trimmed.to_lowercase();

    if let Some((_, canonical)) = STATE_ALIASES.iter().find(|(alias, _)| alias.to_lowercase() == lower)
    {
        return canonical.to_string();
    }

    if let Some(state) = AVAILABLE_STATES.iter().find(|s| s.to_lowercase() == lower) {
        return state.to_string();
    }

    trimmed.to_string()
}

/// Check if a state exists in the crop dataset (with alias support)
pub fn validate_state(state_name: &str) -> bool {
    let normalized = normalize_state_name(state_name);
    AVAILABLE_STATES.contains(&normalized.as_str())
}

/// Check if year is valid for crop data
pub fn validate_year_for_crops(year: i32) -> bool {
    CROP_YEARS.contains(year)
}

/// Canonical water-usage crop name for a (case-insensitive) crop name
pub fn water_usage_crop(crop_name: &str) -> Option<&'static str> {
    let lower = crop_name.trim().to_lowercase();
    WATER_USAGE_CROPS.iter().copied().find(|c| c.to_lowercase() == lower)
}

/// Find the rainfall subdivision reporting for a state.
///
/// Falls back to the upper-cased normalized name when no subdivision covers
/// the state.
pub fn get_subdivision_for_state(state_name: &str) -> String {
    let normalized = normalize_state_name(state_name);

    SUBDIVISION_STATES
        .iter()
        .find(|(_, states)| states.contains(&normalized.as_str()))
        .map(|(subdivision, _)| subdivision.to_string())
        .unwrap_or_else(|| normalized.to_uppercase())
}

/// All subdivisions that report rainfall for a state, in catalog order
pub fn subdivisions_for_state(state_name: &str) -> Vec<&'static str> {
    let normalized = normalize_state_name(state_name);

    SUBDIVISION_STATES
        .iter()
        .filter(|(_, states)| states.contains(&normalized.as_str()))
        .map(|(subdivision, _)| *subdivision)
        .collect()
}

/// States covered by a subdivision (case-insensitive lookup)
pub fn states_for_subdivision(subdivision: &str) -> &'static [&'static str] {
    SUBDIVISION_STATES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(subdivision.trim()))
        .map(|(_, states)| *states)
        .unwrap_or(&[])
}

/// Condensed catalog excerpt embedded in the parser prompt
pub fn prompt_summary() -> String {
    format!(
        "- States: {}... ({} total)\n\
         - Years: Crops ({}-{}), Rainfall ({}-{})\n\
         - Common Crops: {}... (100+ total)\n\
         - Water usage crops: {}\n\
         - Metrics: rainfall, production, water usage",
        AVAILABLE_STATES[..15].join(", "),
        AVAILABLE_STATES.len(),
        CROP_YEARS.min,
        CROP_YEARS.max,
        RAINFALL_YEARS.min,
        RAINFALL_YEARS.max,
        COMMON_CROPS[..10].join(", "),
        WATER_USAGE_CROPS.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_abbreviations() {
        assert_eq!(normalize_state_name("UP"), "Uttar Pradesh");
        assert_eq!(normalize_state_name("up"), "Uttar Pradesh");
        assert_eq!(normalize_state_name("Uttar pradesh"), "Uttar Pradesh");
        assert_eq!(normalize_state_name("Uttar Pradesh"), "Uttar Pradesh");
        assert_eq!(normalize_state_name("j&k"), "Jammu and Kashmir");
    }

    #[test]
    fn test_normalize_old_names() {
        assert_eq!(normalize_state_name("Orissa"), "Odisha");
        assert_eq!(normalize_state_name("madras"), "Tamil Nadu");
        assert_eq!(normalize_state_name("  punjab "), "Punjab");
    }

    #[test]
    fn test_normalize_unknown_returns_input() {
        assert_eq!(normalize_state_name("Atlantis"), "Atlantis");
        assert!(!validate_state("Atlantis"));
    }

    #[test]
    fn test_crop_year_bounds() {
        assert!(validate_year_for_crops(1997));
        assert!(validate_year_for_crops(2014));
        assert!(!validate_year_for_crops(1996));
        assert!(!validate_year_for_crops(2015));
    }

    #[test]
    fn test_subdivision_lookup() {
        assert_eq!(get_subdivision_for_state("Punjab"), "PUNJAB");
        assert_eq!(get_subdivision_for_state("Haryana"), "HARYANA, DELHI & CHANDIGARH");
        assert_eq!(get_subdivision_for_state("UP"), "EAST UTTAR PRADESH");
        assert_eq!(get_subdivision_for_state("Atlantis"), "ATLANTIS");
    }

    #[test]
    fn test_subdivisions_many_to_many() {
        assert_eq!(subdivisions_for_state("Rajasthan"), vec!["WEST RAJASTHAN", "EAST RAJASTHAN"]);
        assert_eq!(
            states_for_subdivision("haryana, delhi & chandigarh"),
            &["Haryana", "Delhi", "Chandigarh"]
        );
        assert!(states_for_subdivision("NOWHERE").is_empty());
    }

    #[test]
    fn test_water_usage_crop() {
        assert_eq!(water_usage_crop("cotton"), Some("Cotton"));
        assert_eq!(water_usage_crop("Wheat"), None);
    }

    #[test]
    fn test_every_subdivision_is_mapped() {
        for subdivision in SUBDIVISIONS {
            assert!(
                !states_for_subdivision(subdivision).is_empty(),
                "{} has no states",
                subdivision
            );
        }
    }
}
