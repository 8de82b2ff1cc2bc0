pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pricing;

use config::PipelineConfig;
use error::CotizaError;
use extraction::PdfExtractor;
use parsing::ParsedQuotation;
use pricing::Quotation;

/// Extract the line-item table and printed totals from a quotation PDF,
/// without pricing.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &PipelineConfig,
) -> Result<ParsedQuotation, CotizaError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "document loaded"
    );
    parsing::parse_pages(&pages, &config.table)
}

/// Price a parsed quotation and reconcile it against its printed totals.
pub fn price_quotation(
    parsed: &ParsedQuotation,
    config: &PipelineConfig,
) -> Result<Quotation, CotizaError> {
    let outcome = pricing::price(&parsed.table, &parsed.totals)?;
    let reconciliation = pricing::reconcile(
        &outcome.rows,
        &outcome.summary,
        &parsed.totals,
        config.reconcile.tolerance,
    );

    let line_items = outcome.rows.iter().map(|r| r.line_item()).collect();

    Ok(Quotation {
        bonus_rate: outcome.bonus_rate,
        totals: parsed.totals.clone(),
        line_items,
        summary: outcome.summary.lines(),
        rows: outcome.rows,
        reconciliation,
    })
}

/// Main API entry point: run the whole pipeline on one quotation PDF.
pub fn process_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &PipelineConfig,
) -> Result<Quotation, CotizaError> {
    let parsed = parse_pdf(pdf_bytes, extractor, config)?;
    price_quotation(&parsed, config)
}
