use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{LineItem, SummaryConcept, SummaryLine};
use crate::parsing::totals::TotalsMap;
use crate::pricing::engine::round_price;
use crate::pricing::reconcile::Reconciliation;

/// One line item after every derived column has been computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedRow {
    pub descripcion: String,
    pub desc_adicional: String,
    pub cantidad: Option<Decimal>,
    pub precio_unit: Option<Decimal>,
    pub pct_desc: Decimal,
    pub pct_iva: Decimal,
    /// Printed gross amount.
    pub importe: Decimal,
    /// Cantidad × Precio Unit, before discount and bonus.
    pub precio_lista: Option<Decimal>,
    /// Importe after the document-wide bonus.
    pub precio_neto: Decimal,
    /// Precio Neto ÷ Cantidad; missing when Cantidad is missing or zero.
    pub precio_neto_unitario: Option<Decimal>,
    pub iva_calculado: Decimal,
    pub precio_con_impuestos: Decimal,
    /// Amounts too large to compute or sum; derived values are zeroed and
    /// the row does not count toward the summary.
    #[serde(default)]
    pub overflowed: bool,
}

impl PricedRow {
    pub(crate) fn into_overflowed(self) -> PricedRow {
        PricedRow {
            precio_neto: Decimal::ZERO,
            precio_neto_unitario: None,
            iva_calculado: Decimal::ZERO,
            precio_con_impuestos: Decimal::ZERO,
            overflowed: true,
            ..self
        }
    }

    /// The six-column hand-off view of this row, rounded.
    pub fn line_item(&self) -> LineItem {
        LineItem {
            descripcion: self.descripcion.clone(),
            desc_adicional: self.desc_adicional.clone(),
            cantidad: self.cantidad.map(round_price),
            precio: self.precio_neto_unitario.map(round_price),
            pct_iva: round_price(self.pct_iva),
            precio_neto: round_price(self.precio_neto),
        }
    }
}

/// Aggregates over all priced rows, each rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub subtotal: Decimal,
    pub iva_21: Decimal,
    pub iva_105: Decimal,
    pub total: Decimal,
}

impl SummaryTotals {
    pub fn get(&self, concept: SummaryConcept) -> Decimal {
        match concept {
            SummaryConcept::Subtotal => self.subtotal,
            SummaryConcept::Iva21 => self.iva_21,
            SummaryConcept::Iva105 => self.iva_105,
            SummaryConcept::Total => self.total,
        }
    }

    /// The four-row summary hand-off table.
    pub fn lines(&self) -> Vec<SummaryLine> {
        SummaryConcept::ALL
            .into_iter()
            .map(|concepto| SummaryLine {
                concepto,
                importe: self.get(concepto),
            })
            .collect()
    }
}

/// Output of the pricing engine for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOutcome {
    pub bonus_rate: Decimal,
    pub rows: Vec<PricedRow>,
    pub summary: SummaryTotals,
}

/// Full result for one quotation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub bonus_rate: Decimal,
    pub totals: TotalsMap,
    pub rows: Vec<PricedRow>,
    pub line_items: Vec<LineItem>,
    pub summary: Vec<SummaryLine>,
    pub reconciliation: Reconciliation,
}

/// The two tables handed to report renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandOff {
    pub line_items: Vec<LineItem>,
    pub summary: Vec<SummaryLine>,
}

impl Quotation {
    pub fn hand_off(&self) -> HandOff {
        HandOff {
            line_items: self.line_items.clone(),
            summary: self.summary.clone(),
        }
    }

    pub fn summary_amount(&self, concept: SummaryConcept) -> Option<Decimal> {
        self.summary
            .iter()
            .find(|l| l.concepto == concept)
            .map(|l| l.importe)
    }
}
