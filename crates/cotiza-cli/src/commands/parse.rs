use cotiza_core::error::CotizaError;
use cotiza_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    config_file: Option<PathBuf>,
) -> Result<(), CotizaError> {
    let config = super::load_config(config_file)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    tracing::debug!(file = %pdf_file.display(), bytes = pdf_bytes.len(), "parsing quotation");
    let extractor = PdftotextExtractor::from_config(&config.pdftotext);
    let parsed = cotiza_core::parse_pdf(&pdf_bytes, &extractor, &config)?;

    match output_format {
        "json" => output::json::print(&parsed)?,
        _ => println!("{}", output::table::format_parsed(&parsed)),
    }

    Ok(())
}
