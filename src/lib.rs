pub mod material;
pub mod field_normalizer;
pub mod nutrition_aggregator;
pub mod batch_report;
pub mod source;
pub mod pipeline;
pub mod cli;
