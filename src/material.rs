use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// Weight assumed for a material when the upload does not supply one.
/// Nutrition strings are stated per 100 units, so 100 means "scale by 1.0".
pub const DEFAULT_WEIGHT: f64 = 100.0;

/// Nutrient label -> display string such as `"8.1 g"`. Insertion ordered.
pub type NutritionMap = IndexMap<String, String>;

/// Nutrient label -> `"<total, 2-decimal> <unit>"` for a whole batch.
pub type AggregatedNutrition = IndexMap<String, String>;

/// `material_no` -> weight, supplied by the caller.
pub type WeightMap = HashMap<String, f64>;

/// One row as returned by the material data source.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct RawMaterialRecord {
    pub material_no: String,
    pub ingredients: Option<String>,
    pub allergen: Option<String>,
    pub allergen_may_contain: Option<String>,
    pub nutritional_information: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct NormalizedMaterialRecord {
    pub material_no: String,
    pub ingredients: Vec<String>,
    pub allergen: Vec<String>,
    pub allergen_may_contain: Vec<String>,
    pub nutritional_information: NutritionMap,
}

/// Effective weight for `material_no`, falling back to [`DEFAULT_WEIGHT`].
pub fn weight_for(weights: Option<&WeightMap>, material_no: &str) -> f64 {
    weights
        .and_then(|w| w.get(material_no).copied())
        .unwrap_or(DEFAULT_WEIGHT)
}
