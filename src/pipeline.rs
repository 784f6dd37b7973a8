use anyhow::Result;
use tracing::info;

use crate::batch_report::{build_report, BatchReport};
use crate::source::{MaterialSource, Upload};

/// Looks up every uploaded material and builds the batch report.
/// With `weighted == false` the upload's weights are ignored.
pub fn digest_upload(upload: &Upload, source: &dyn MaterialSource, weighted: bool) -> Result<BatchReport> {
    let raw = source.fetch(&upload.material_nos)?;
    let weights = weighted.then_some(&upload.weights);
    let report = build_report(&upload.material_nos, &raw, weights);
    info!(
        found = report.found,
        missing = report.missing.len(),
        nutrients = report.nutrition.len(),
        "digested upload"
    );
    Ok(report)
}
