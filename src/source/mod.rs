pub mod data_loader;
pub mod material_source;

pub use data_loader::{load_material_records, load_upload, LoaderError, Upload};
pub use material_source::{CsvMaterialSource, InMemorySource, MaterialSource};
