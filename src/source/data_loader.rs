use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::material::{RawMaterialRecord, WeightMap, DEFAULT_WEIGHT};

pub const MATERIAL_NO_COL: &str = "material_no";
pub const WEIGHT_COL: &str = "weight";
pub const INGREDIENTS_COL: &str = "ingredients";
pub const ALLERGEN_COL: &str = "allergen";
pub const MAY_CONTAIN_COL: &str = "allergen_may_contain";
pub const NUTRITION_COL: &str = "nutritional_information";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("The file must contain a '{0}' column")]
    MissingColumn(String),
}

/// The user's upload: which materials to look up and how much of each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upload {
    /// Upload order, duplicates kept.
    pub material_nos: Vec<String>,
    pub weights: WeightMap,
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::NotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows leave trailing optional cells out
        .trim(csv::Trim::Headers)
        .from_reader(file))
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, LoaderError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
}

fn optional_cell(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn parse_weight(cell: Option<&str>, material_no: &str, row_index: usize) -> f64 {
    let Some(raw) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_WEIGHT;
    };
    match raw.parse::<f64>() {
        Ok(w) if w.is_finite() => w,
        _ => {
            warn!(material_no, row_index, weight = raw, "unusable weight, using default");
            DEFAULT_WEIGHT
        }
    }
}

/// Reads an upload CSV. `material_no` is required, `weight` is optional.
pub fn load_upload(path: &Path) -> Result<Upload> {
    let mut rdr = open_csv(path).with_context(|| format!("Failed to open upload file {:?}", path))?;
    let headers = rdr.headers()?.clone();

    let material_idx = column_index(&headers, MATERIAL_NO_COL)?;
    let weight_idx = headers.iter().position(|h| h == WEIGHT_COL);

    let mut upload = Upload::default();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read upload row {}", row_index))?;

        let material_no = record.get(material_idx).unwrap_or("").trim().to_string();
        if material_no.is_empty() {
            continue;
        }
        let weight = parse_weight(weight_idx.and_then(|i| record.get(i)), &material_no, row_index);

        upload.weights.insert(material_no.clone(), weight);
        upload.material_nos.push(material_no);
    }

    info!(
        path = %path.display(),
        rows = upload.material_nos.len(),
        weighted = weight_idx.is_some(),
        "loaded upload"
    );
    Ok(upload)
}

/// Reads a CSV export of the material table.
pub fn load_material_records(path: &Path) -> Result<Vec<RawMaterialRecord>> {
    let mut rdr = open_csv(path).with_context(|| format!("Failed to open material file {:?}", path))?;
    let headers = rdr.headers()?.clone();

    let material_idx = column_index(&headers, MATERIAL_NO_COL)?;
    let ingredients_idx = column_index(&headers, INGREDIENTS_COL)?;
    let allergen_idx = column_index(&headers, ALLERGEN_COL)?;
    let may_contain_idx = column_index(&headers, MAY_CONTAIN_COL)?;
    let nutrition_idx = column_index(&headers, NUTRITION_COL)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read material row {}", row_index))?;
        let material_no = record.get(material_idx).unwrap_or("").trim().to_string();
        if material_no.is_empty() {
            continue;
        }
        records.push(RawMaterialRecord {
            material_no,
            ingredients: optional_cell(&record, ingredients_idx),
            allergen: optional_cell(&record, allergen_idx),
            allergen_may_contain: optional_cell(&record, may_contain_idx),
            nutritional_information: optional_cell(&record, nutrition_idx),
        });
    }

    info!(path = %path.display(), rows = records.len(), "loaded material table");
    Ok(records)
}
