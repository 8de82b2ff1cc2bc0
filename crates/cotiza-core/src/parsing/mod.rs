pub mod columns;
pub mod totals;
pub mod values;

use serde::{Deserialize, Serialize};

use crate::config::TableSettings;
use crate::error::CotizaError;
use crate::extraction::table::extract_first_table;
use crate::extraction::PageContent;
use columns::{normalize_grid, NormalizedTable};
use totals::{scan_totals, TotalsMap};

/// Everything read from one quotation document, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuotation {
    /// Page the line-item table was taken from.
    pub table_page: usize,
    pub table: NormalizedTable,
    pub totals: TotalsMap,
}

/// Extract the line-item table and the printed totals from page text.
///
/// The table and the totals are read independently from the same pages.
pub fn parse_pages(
    pages: &[PageContent],
    settings: &TableSettings,
) -> Result<ParsedQuotation, CotizaError> {
    let totals = scan_totals(pages);
    let grid = extract_first_table(pages, settings)?;
    let table = normalize_grid(&grid)?;

    Ok(ParsedQuotation {
        table_page: grid.page_number,
        table,
        totals,
    })
}
