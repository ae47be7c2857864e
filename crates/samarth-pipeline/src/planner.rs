//! Mapping from intent and entities to dataset requests

use samarth_core::models::{ApiKind, ApiSpec, Intent, ParsedQuery};

/// Crop used for water efficiency data when none was named
pub const DEFAULT_WATER_CROP: &str = "Cotton";

/// Decide which datasets a question needs, in rainfall, crops, water order
pub fn determine_required_apis(parsed: &ParsedQuery) -> Vec<ApiSpec> {
    let entities = &parsed.entities;
    let intent = parsed.intent;
    let mut plan = Vec::new();

    if entities.has_metric("rainfall") || matches!(intent, Intent::Comparison | Intent::Trend) {
        plan.push(
            ApiSpec::new(ApiKind::Rainfall)
                .with_states(entities.states.iter().cloned())
                .with_years(entities.years.iter().copied()),
        );
    }

    if entities.has_metric("production")
        || !entities.crops.is_empty()
        || matches!(intent, Intent::Comparison | Intent::Extreme | Intent::Trend)
    {
        plan.push(
            ApiSpec::new(ApiKind::Crops)
                .with_states(entities.states.iter().cloned())
                .with_crops(entities.crops.iter().cloned())
                .with_years(entities.years.iter().copied()),
        );
    }

    if entities.mentions_water() || intent == Intent::Policy {
        let crops = if entities.crops.is_empty() {
            vec![DEFAULT_WATER_CROP.to_string()]
        } else {
            entities.crops.clone()
        };
        plan.push(ApiSpec::new(ApiKind::Water).with_crops(crops));
    }

    tracing::info!(
        apis = ?plan.iter().map(|spec| spec.api.as_str()).collect::<Vec<_>>(),
        "APIs needed"
    );

    plan
}
