use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns of the quotation table that the pipeline knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Descripción Artículo")]
    DescripcionArticulo,
    #[serde(rename = "Desc. Adicional")]
    DescAdicional,
    #[serde(rename = "Cantidad")]
    Cantidad,
    #[serde(rename = "Precio Unit")]
    PrecioUnit,
    #[serde(rename = "% Desc.")]
    PctDesc,
    #[serde(rename = "% IVA")]
    PctIva,
    #[serde(rename = "Importe")]
    Importe,
}

impl Column {
    /// Every column the pricing engine consumes, in table order.
    pub const REQUIRED: [Column; 7] = [
        Column::DescripcionArticulo,
        Column::DescAdicional,
        Column::Cantidad,
        Column::PrecioUnit,
        Column::PctDesc,
        Column::PctIva,
        Column::Importe,
    ];

    /// Header text as printed on the quotation.
    pub fn label(self) -> &'static str {
        match self {
            Column::DescripcionArticulo => "Descripción Artículo",
            Column::DescAdicional => "Desc. Adicional",
            Column::Cantidad => "Cantidad",
            Column::PrecioUnit => "Precio Unit",
            Column::PctDesc => "% Desc.",
            Column::PctIva => "% IVA",
            Column::Importe => "Importe",
        }
    }

    /// Match a header cell against the vocabulary.
    ///
    /// Surrounding whitespace is ignored, internal runs of whitespace
    /// collapse to one space and the comparison is case-insensitive.
    pub fn from_header(s: &str) -> Option<Column> {
        let norm = normalize_ws(s).to_lowercase();
        Column::REQUIRED
            .into_iter()
            .find(|c| c.label().to_lowercase() == norm)
    }

    /// Columns holding free text rather than numbers.
    pub fn is_text(self) -> bool {
        matches!(self, Column::DescripcionArticulo | Column::DescAdicional)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Labels of the printed totals in the document's free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TotalLabel {
    #[serde(rename = "Subtotal Cotización")]
    SubtotalCotizacion,
    #[serde(rename = "Bonificación")]
    Bonificacion,
    #[serde(rename = "Subtotal Neto")]
    SubtotalNeto,
    #[serde(rename = "IVA")]
    Iva,
    #[serde(rename = "Total Cotización")]
    TotalCotizacion,
}

impl TotalLabel {
    pub const ALL: [TotalLabel; 5] = [
        TotalLabel::SubtotalCotizacion,
        TotalLabel::Bonificacion,
        TotalLabel::SubtotalNeto,
        TotalLabel::Iva,
        TotalLabel::TotalCotizacion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TotalLabel::SubtotalCotizacion => "Subtotal Cotización",
            TotalLabel::Bonificacion => "Bonificación",
            TotalLabel::SubtotalNeto => "Subtotal Neto",
            TotalLabel::Iva => "IVA",
            TotalLabel::TotalCotizacion => "Total Cotización",
        }
    }

    pub fn from_label(s: &str) -> Option<TotalLabel> {
        TotalLabel::ALL.into_iter().find(|l| l.label() == s)
    }
}

impl fmt::Display for TotalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rows of the summary table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryConcept {
    #[serde(rename = "Subtotal")]
    Subtotal,
    #[serde(rename = "IVA 21%")]
    Iva21,
    #[serde(rename = "IVA 10.5%")]
    Iva105,
    #[serde(rename = "Total")]
    Total,
}

impl SummaryConcept {
    pub const ALL: [SummaryConcept; 4] = [
        SummaryConcept::Subtotal,
        SummaryConcept::Iva21,
        SummaryConcept::Iva105,
        SummaryConcept::Total,
    ];
}

impl fmt::Display for SummaryConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryConcept::Subtotal => write!(f, "Subtotal"),
            SummaryConcept::Iva21 => write!(f, "IVA 21%"),
            SummaryConcept::Iva105 => write!(f, "IVA 10.5%"),
            SummaryConcept::Total => write!(f, "Total"),
        }
    }
}

/// A table row with its numeric cells coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRow {
    pub descripcion: String,
    pub desc_adicional: String,
    pub cantidad: Option<Decimal>,
    pub precio_unit: Option<Decimal>,
    pub pct_desc: Decimal,
    pub pct_iva: Decimal,
    /// Printed gross amount of the row.
    pub importe: Decimal,
}

/// One row of the line-item hand-off table.
///
/// Field order matches the output column order; JSON keys are the printed
/// column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "Descripción Artículo")]
    pub descripcion: String,
    #[serde(rename = "Desc. Adicional")]
    pub desc_adicional: String,
    #[serde(rename = "Cantidad")]
    pub cantidad: Option<Decimal>,
    /// Net unit price. `None` when the quantity was missing or zero.
    #[serde(rename = "Precio")]
    pub precio: Option<Decimal>,
    #[serde(rename = "% IVA")]
    pub pct_iva: Decimal,
    #[serde(rename = "Precio Neto")]
    pub precio_neto: Decimal,
}

/// One concept/amount pair of the summary hand-off table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    #[serde(rename = "Concepto")]
    pub concepto: SummaryConcept,
    #[serde(rename = "Importe")]
    pub importe: Decimal,
}

pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
