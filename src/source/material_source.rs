use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use super::data_loader::load_material_records;
use crate::material::RawMaterialRecord;

/// Where raw material rows come from. Implementations return the rows whose
/// `material_no` is among `material_nos`, in their own storage order.
pub trait MaterialSource {
    fn fetch(&self, material_nos: &[String]) -> Result<Vec<RawMaterialRecord>>;
}

fn select_requested(rows: &[RawMaterialRecord], material_nos: &[String]) -> Vec<RawMaterialRecord> {
    let wanted: HashSet<&str> = material_nos.iter().map(String::as_str).collect();
    rows.iter()
        .filter(|r| wanted.contains(r.material_no.as_str()))
        .cloned()
        .collect()
}

fn log_fetch(source: &str, requested: &[String], found: &[RawMaterialRecord]) {
    info!(source, requested = requested.len(), found = found.len(), "fetched material rows");
    let present: HashSet<&str> = found.iter().map(|r| r.material_no.as_str()).collect();
    for material_no in requested.iter().filter(|m| !present.contains(m.as_str())) {
        warn!(material_no = %material_no, "no material row found");
    }
}

/// Material rows read from a CSV export of the material table.
#[derive(Debug, Clone)]
pub struct CsvMaterialSource {
    path: PathBuf,
}

impl CsvMaterialSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MaterialSource for CsvMaterialSource {
    fn fetch(&self, material_nos: &[String]) -> Result<Vec<RawMaterialRecord>> {
        let rows = load_material_records(&self.path)
            .with_context(|| format!("Failed to load material table from {:?}", self.path))?;
        let found = select_requested(&rows, material_nos);
        log_fetch("csv", material_nos, &found);
        Ok(found)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawMaterialRecord>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawMaterialRecord>) -> Self {
        Self { rows }
    }
}

impl MaterialSource for InMemorySource {
    fn fetch(&self, material_nos: &[String]) -> Result<Vec<RawMaterialRecord>> {
        let found = select_requested(&self.rows, material_nos);
        log_fetch("memory", material_nos, &found);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(material_no: &str) -> RawMaterialRecord {
        RawMaterialRecord {
            material_no: material_no.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_in_memory_fetch_keeps_storage_order() -> Result<()> {
        let source = InMemorySource::new(vec![row("C"), row("A"), row("B")]);
        let requested = vec!["A".to_string(), "C".to_string(), "A".to_string(), "Z".to_string()];
        let found = source.fetch(&requested)?;
        let ids: Vec<&str> = found.iter().map(|r| r.material_no.as_str()).collect();
        assert_eq!(ids, vec!["C", "A"]);
        Ok(())
    }

    #[test]
    fn test_csv_source_missing_file_is_error() {
        let source = CsvMaterialSource::new("no_such_materials.csv");
        assert!(source.fetch(&["A".to_string()]).is_err());
    }
}
