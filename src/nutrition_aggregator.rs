use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::material::{weight_for, AggregatedNutrition, NormalizedMaterialRecord, WeightMap, DEFAULT_WEIGHT};

// Same number grammar as the nutrition parser, anchored at the start of the display string.
static RE_DISPLAY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<?(?:[0-9]+\.?[0-9]*|\.[0-9]+))\s*([a-zA-Zµμ%]*)").unwrap());

/// Running total for one nutrient across a batch.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NutrientTotal {
    pub value: f64,
    pub unit: String,
}

impl NutrientTotal {
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.value, self.unit).trim().to_string()
    }
}

/// Splits a display string like `"<0.5 g"` into `(0.5, "g")`.
/// Returns `None` when no leading number is present.
fn parse_display_value(display: &str) -> Option<(f64, &str)> {
    let caps = RE_DISPLAY_VALUE.captures(display.trim())?;
    let number = caps.get(1)?.as_str();
    let unit = caps.get(2).map_or("", |m| m.as_str());
    let value = number.trim_start_matches('<').parse::<f64>().unwrap_or(0.0);
    Some((value, unit))
}

fn default_unit(nutrient: &str) -> &'static str {
    if nutrient.contains("Energy") {
        "kcal"
    } else {
        "g"
    }
}

/// Sums every record's nutrients scaled by `weight / 100`.
///
/// Nutrients appear in order of first contribution. The unit kept for a nutrient
/// is the one resolved from the last record that contributed to it.
pub fn aggregate_totals(
    records: &[NormalizedMaterialRecord],
    weights: Option<&WeightMap>,
) -> IndexMap<String, NutrientTotal> {
    let mut totals: IndexMap<String, NutrientTotal> = IndexMap::new();

    for record in records {
        let weight = weight_for(weights, &record.material_no);
        let scale_factor = weight / DEFAULT_WEIGHT;

        for (nutrient, value_text) in &record.nutritional_information {
            let Some((value, unit)) = parse_display_value(value_text) else {
                debug!(
                    material_no = %record.material_no,
                    nutrient = %nutrient,
                    value_text = %value_text,
                    "no numeric value, skipping nutrient"
                );
                continue;
            };
            let unit = if unit.is_empty() { default_unit(nutrient) } else { unit };

            let total = totals.entry(nutrient.clone()).or_insert_with(|| NutrientTotal {
                value: 0.0,
                unit: String::new(),
            });
            total.value += value * scale_factor;
            total.unit = unit.to_string();
        }
    }
    totals
}

/// Combined nutrition for a batch, formatted as `"<total, 2-decimal> <unit>"`.
pub fn aggregate(
    records: &[NormalizedMaterialRecord],
    weights: Option<&WeightMap>,
) -> AggregatedNutrition {
    aggregate_totals(records, weights)
        .into_iter()
        .map(|(nutrient, total)| {
            let display = total.display();
            (nutrient, display)
        })
        .collect()
}
