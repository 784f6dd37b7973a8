use anyhow::{Context, Result};
use material_digest::cli::{log_filter, parse_args, OutputFormat};
use material_digest::pipeline::digest_upload;
use material_digest::source::{load_upload, CsvMaterialSource};

fn main() -> Result<()> {
    dotenv::dotenv().ok(); // .env may supply the materials path

    // Logs go to stderr so stdout stays clean for the report
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli_args = parse_args();

    let upload = load_upload(&cli_args.upload)
        .with_context(|| format!("Failed to read upload file {:?}", cli_args.upload))?;
    let source = CsvMaterialSource::new(cli_args.materials.clone());

    let report = digest_upload(&upload, &source, !cli_args.unweighted)?;

    match cli_args.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}
