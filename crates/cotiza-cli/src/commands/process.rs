use cotiza_core::error::CotizaError;
use cotiza_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    verbose: bool,
) -> Result<(), CotizaError> {
    let config = super::load_config(config_file)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    tracing::debug!(file = %pdf_file.display(), bytes = pdf_bytes.len(), "processing quotation");
    let extractor = PdftotextExtractor::from_config(&config.pdftotext);
    let quotation = cotiza_core::process_pdf(&pdf_bytes, &extractor, &config)?;

    match output_format {
        "json" => output::json::print(&quotation)?,
        _ => println!("{}", output::table::format_quotation(&quotation, verbose)),
    }

    if let Some(path) = output_file {
        // The file always holds the hand-off tables as JSON
        let json = serde_json::to_string_pretty(&quotation.hand_off())?;
        std::fs::write(&path, json)?;
        eprintln!(
            "Processed {} line item(s), written to {}",
            quotation.line_items.len(),
            path.display()
        );
        if !quotation.reconciliation.totals_match() {
            eprintln!("  warning: printed totals do not match the line items");
        }
    }

    Ok(())
}
