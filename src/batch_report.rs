use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::field_normalizer::normalize_records;
use crate::material::{AggregatedNutrition, NormalizedMaterialRecord, RawMaterialRecord, WeightMap};
use crate::nutrition_aggregator::aggregate;

const NO_INGREDIENTS: &str = "No ingredients detected";
const NO_ALLERGENS: &str = "No allergens detected";
const NO_MAY_CONTAIN: &str = "No additional allergens listed";
const NO_DATA: &str = "No data found for the provided material numbers.";

/// Everything the rendering side needs for one upload batch.
#[derive(Debug, Serialize, Clone, Default)]
pub struct BatchReport {
    pub requested: usize,
    pub found: usize,
    pub missing: Vec<String>,
    pub records: Vec<NormalizedMaterialRecord>,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub may_contain: Vec<String>,
    pub nutrition: AggregatedNutrition,
}

/// Sorted, de-duplicated union of one list field across the batch.
pub fn union_of<'a, F>(records: &'a [NormalizedMaterialRecord], field: F) -> Vec<String>
where
    F: Fn(&'a NormalizedMaterialRecord) -> &'a [String],
{
    records
        .iter()
        .flat_map(|r| field(r).iter())
        .filter(|token| !token.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn missing_materials(requested: &[String], raw: &[RawMaterialRecord]) -> Vec<String> {
    let found: HashSet<&str> = raw.iter().map(|r| r.material_no.as_str()).collect();
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|m| !found.contains(m.as_str()) && seen.insert(m.as_str()))
        .cloned()
        .collect()
}

pub fn build_report(
    requested: &[String],
    raw: &[RawMaterialRecord],
    weights: Option<&WeightMap>,
) -> BatchReport {
    let records = normalize_records(raw);
    let nutrition = aggregate(&records, weights);

    BatchReport {
        requested: requested.len(),
        found: raw.len(),
        missing: missing_materials(requested, raw),
        ingredients: union_of(&records, |r| r.ingredients.as_slice()),
        allergens: union_of(&records, |r| r.allergen.as_slice()),
        may_contain: union_of(&records, |r| r.allergen_may_contain.as_slice()),
        nutrition,
        records,
    }
}

fn joined_or(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(", ")
    }
}

fn overview_line(record: &NormalizedMaterialRecord) -> String {
    let list = |items: &[String]| if items.is_empty() { "-".to_string() } else { items.join(", ") };
    let nutrients = record
        .nutritional_information
        .iter()
        .map(|(k, v)| format!("{} {}", k, v))
        .collect::<Vec<_>>();
    format!(
        "ingredients: {} | allergen: {} | may contain: {} | nutrition: {}",
        list(&record.ingredients),
        list(&record.allergen),
        list(&record.allergen_may_contain),
        list(&nutrients)
    )
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Materials: {} requested, {} found", self.requested, self.found)?;
        if !self.missing.is_empty() {
            writeln!(f, "Not found: {}", self.missing.join(", "))?;
        }
        if self.records.is_empty() {
            return writeln!(f, "{}", NO_DATA);
        }

        writeln!(f, "\nMaterial Data Overview")?;
        let id_width = self.records.iter().map(|r| r.material_no.chars().count()).max().unwrap_or(0);
        for record in &self.records {
            writeln!(f, "  {:<width$}  {}", record.material_no, overview_line(record), width = id_width)?;
        }

        writeln!(f, "\nUnique Ingredients\n  {}", joined_or(&self.ingredients, NO_INGREDIENTS))?;
        writeln!(f, "\nAllergens\n  {}", joined_or(&self.allergens, NO_ALLERGENS))?;
        writeln!(f, "\nMay Contain\n  {}", joined_or(&self.may_contain, NO_MAY_CONTAIN))?;

        if !self.nutrition.is_empty() {
            writeln!(f, "\nNutritional Information")?;
            let width = self.nutrition.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            for (nutrient, value) in &self.nutrition {
                writeln!(f, "  {:<width$}  {}", nutrient, value, width = width)?;
            }
        }
        Ok(())
    }
}

impl BatchReport {
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}
