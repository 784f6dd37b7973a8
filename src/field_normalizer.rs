use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::material::{NormalizedMaterialRecord, NutritionMap, RawMaterialRecord};

// Comma, or the word "and" with a space on each side. "sandalwood" is never split.
static RE_LIST_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",| and ").unwrap());
static RE_SEGMENT_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,]").unwrap());
// label, separator, number (optional '<', at most one '.'), optional unit
static RE_NUTRIENT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\w\s\-]+?)[:\s]+(<?(?:[0-9]+\.?[0-9]*|\.[0-9]+))\s*([a-zA-Zµμ%]*)").unwrap()
});

/// Splits a raw ingredient/allergen field into lowercase, trimmed tokens.
///
/// Absent or empty input yields an empty list. Order of appearance is kept and
/// duplicates are not removed.
pub fn normalize_list(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw.filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    RE_LIST_DELIMITER
        .split(text)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Parses free-text nutrition information such as
/// `"Energy: 342 kcal, protein: 8.1g"` into `{"Energy": "342 kcal", "Protein": "8.1 g"}`.
///
/// Best effort: segments that don't look like `label value [unit]` are dropped.
/// A repeated label keeps its first position but takes the later value.
pub fn parse_nutrition_string(raw: Option<&str>) -> NutritionMap {
    let mut nutrition = NutritionMap::new();
    let Some(text) = raw else {
        return nutrition;
    };

    for segment in RE_SEGMENT_DELIMITER.split(text) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some(caps) = RE_NUTRIENT_ENTRY.captures(segment) else {
            debug!(segment, "skipping unrecognised nutrition segment");
            continue;
        };

        let label = capitalize_first(caps[1].trim());
        let value = format!("{} {}", &caps[2], &caps[3]).trim().to_string();
        nutrition.insert(label, value);
    }
    nutrition
}

/// Uppercases the first character and leaves the rest untouched.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn normalize_record(raw: &RawMaterialRecord) -> NormalizedMaterialRecord {
    NormalizedMaterialRecord {
        material_no: raw.material_no.clone(),
        ingredients: normalize_list(raw.ingredients.as_deref()),
        allergen: normalize_list(raw.allergen.as_deref()),
        allergen_may_contain: normalize_list(raw.allergen_may_contain.as_deref()),
        nutritional_information: parse_nutrition_string(raw.nutritional_information.as_deref()),
    }
}

pub fn normalize_records(raw: &[RawMaterialRecord]) -> Vec<NormalizedMaterialRecord> {
    raw.iter().map(normalize_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_list_absent_or_empty() {
        assert!(normalize_list(None).is_empty());
        assert!(normalize_list(Some("")).is_empty());
        assert!(normalize_list(Some(" ,  , ")).is_empty());
    }

    #[test]
    fn test_normalize_list_commas_and_and() {
        assert_eq!(
            normalize_list(Some("Milk, Soy and Wheat")),
            vec!["milk", "soy", "wheat"]
        );
    }

    #[test]
    fn test_normalize_list_does_not_split_inside_words() {
        assert_eq!(
            normalize_list(Some("Sandalwood extract")),
            vec!["sandalwood extract"]
        );
        // Delimiter is case-sensitive
        assert_eq!(
            normalize_list(Some("Salt AND Pepper")),
            vec!["salt and pepper"]
        );
    }

    #[test]
    fn test_normalize_list_keeps_duplicates_and_order() {
        assert_eq!(
            normalize_list(Some("Wheat, milk, WHEAT and egg")),
            vec!["wheat", "milk", "wheat", "egg"]
        );
    }

    #[test]
    fn test_normalize_list_is_idempotent_on_normalized_tokens() {
        let once = normalize_list(Some("oat flour, sugar, sea salt"));
        assert_eq!(once, vec!["oat flour", "sugar", "sea salt"]);
        let again: Vec<String> = once
            .iter()
            .flat_map(|token| normalize_list(Some(token)))
            .collect();
        assert_eq!(again, once);
    }

    #[test]
    fn test_parse_nutrition_string_basic() {
        let nutrition = parse_nutrition_string(Some("Energy: 342 kcal, protein: 8.1g"));
        assert_eq!(nutrition.len(), 2);
        assert_eq!(nutrition["Energy"], "342 kcal");
        assert_eq!(nutrition["Protein"], "8.1 g");
    }

    #[test]
    fn test_parse_nutrition_string_full_example() {
        let nutrition = parse_nutrition_string(Some(
            "Energy: 342 kcal, protein: 8.1g, carbohydrate: 73.8g, fat: 3.8g sodium 15mg",
        ));
        let keys: Vec<&str> = nutrition.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Energy", "Protein", "Carbohydrate", "Fat"]);
        // Only the leading entry of a segment is read
        assert_eq!(nutrition["Fat"], "3.8 g");
    }

    #[test]
    fn test_parse_nutrition_string_garbage() {
        assert!(parse_nutrition_string(Some("garbage text")).is_empty());
        assert!(parse_nutrition_string(Some("")).is_empty());
        assert!(parse_nutrition_string(None).is_empty());
    }

    #[test]
    fn test_parse_nutrition_string_skips_bad_segments_only() {
        let nutrition = parse_nutrition_string(Some("n/a; salt: <0.01 g; fibre: trace"));
        assert_eq!(nutrition.len(), 1);
        assert_eq!(nutrition["Salt"], "<0.01 g");
    }

    #[test]
    fn test_parse_nutrition_string_units_and_separators() {
        let nutrition = parse_nutrition_string(Some(
            "saturated-fat 1.2 g; Vitamin B12: 0.5µg; Calcium 12%; water: 80",
        ));
        assert_eq!(nutrition["Saturated-fat"], "1.2 g");
        assert_eq!(nutrition["Vitamin B12"], "0.5 µg");
        assert_eq!(nutrition["Calcium"], "12 %");
        assert_eq!(nutrition["Water"], "80");
    }

    #[test]
    fn test_parse_nutrition_string_drops_non_ascii_numbers() {
        let nutrition = parse_nutrition_string(Some("Energy: ٣٤٢ kcal, fat: ３g, salt: 0.3g"));
        assert_eq!(nutrition.len(), 1);
        assert_eq!(nutrition["Salt"], "0.3 g");
    }

    #[test]
    fn test_parse_nutrition_string_later_duplicate_wins() {
        let nutrition = parse_nutrition_string(Some("fat: 3g, sugar: 1g, fat: 4g"));
        assert_eq!(nutrition["Fat"], "4 g");
        assert_eq!(nutrition.get_index(0).map(|(k, _)| k.as_str()), Some("Fat"));
    }

    #[test]
    fn test_capitalize_first_leaves_rest() {
        assert_eq!(capitalize_first("energy"), "Energy");
        assert_eq!(capitalize_first("sodium CHLORIDE"), "Sodium CHLORIDE");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_normalize_record() {
        let raw = RawMaterialRecord {
            material_no: "M-100".to_string(),
            ingredients: Some("Oats, Honey and Almonds".to_string()),
            allergen: Some("Nuts".to_string()),
            allergen_may_contain: None,
            nutritional_information: Some("energy 400kcal".to_string()),
        };
        let normalized = normalize_record(&raw);
        assert_eq!(normalized.material_no, "M-100");
        assert_eq!(normalized.ingredients, vec!["oats", "honey", "almonds"]);
        assert_eq!(normalized.allergen, vec!["nuts"]);
        assert!(normalized.allergen_may_contain.is_empty());
        assert_eq!(normalized.nutritional_information["Energy"], "400 kcal");
    }
}
