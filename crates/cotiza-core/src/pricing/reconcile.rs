use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::TotalLabel;
use crate::parsing::totals::TotalsMap;
use crate::pricing::engine::round_price;
use crate::pricing::outcome::{PricedRow, SummaryTotals};

/// Comparison of one printed total with the value recomputed from the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCheck {
    pub label: TotalLabel,
    pub printed: Decimal,
    pub computed: Decimal,
    /// computed − printed
    pub difference: Decimal,
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssue {
    /// Printed Importe differs from the discounted list price.
    ImporteMismatch { expected: Decimal, printed: Decimal },
    MissingCantidad,
    MissingPrecioUnit,
    /// VAT rate outside the 21 / 10.5 / 0 bands; it counts toward the
    /// total but toward neither VAT summary line.
    UnknownIvaRate { rate: Decimal },
    /// Amounts too large to price; the row is left out of the summary.
    ArithmeticOverflow,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::ImporteMismatch { expected, printed } => write!(
                f,
                "printed Importe {printed} differs from discounted list price {expected}"
            ),
            RowIssue::MissingCantidad => write!(f, "Cantidad is not a number"),
            RowIssue::MissingPrecioUnit => write!(f, "Precio Unit is not a number"),
            RowIssue::UnknownIvaRate { rate } => {
                write!(f, "% IVA {rate} is not in a known band")
            }
            RowIssue::ArithmeticOverflow => write!(f, "amounts overflow decimal range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    /// 1-based position in the line-item table.
    pub row: usize,
    pub descripcion: String,
    pub issue: RowIssue,
}

/// How well the table agrees with the document's printed totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub checks: Vec<TotalCheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_warnings: Vec<RowWarning>,
}

impl Reconciliation {
    /// True when every printed total that could be checked matched.
    pub fn totals_match(&self) -> bool {
        self.checks.iter().all(|c| c.within_tolerance)
    }
}

pub fn reconcile(
    rows: &[PricedRow],
    summary: &SummaryTotals,
    totals: &TotalsMap,
    tolerance: Decimal,
) -> Reconciliation {
    let importe_sum = rows
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.importe));

    let computed_for = |label: TotalLabel| -> Option<Decimal> {
        match label {
            TotalLabel::SubtotalCotizacion => importe_sum.map(round_price),
            TotalLabel::Bonificacion => None,
            TotalLabel::SubtotalNeto => Some(summary.subtotal),
            TotalLabel::Iva => summary.iva_21.checked_add(summary.iva_105),
            TotalLabel::TotalCotizacion => Some(summary.total),
        }
    };

    let checks: Vec<TotalCheck> = totals
        .iter()
        .filter_map(|(label, printed)| {
            if label == TotalLabel::Bonificacion {
                return None;
            }
            let Some((computed, difference)) = computed_for(label)
                .and_then(|computed| Some((computed, computed.checked_sub(printed)?)))
            else {
                tracing::warn!(%label, %printed, "printed total cannot be recomputed");
                return None;
            };
            let within_tolerance = difference.abs() <= tolerance;
            if !within_tolerance {
                tracing::warn!(
                    %label,
                    %printed,
                    %computed,
                    "printed total does not match the line items"
                );
            }
            Some(TotalCheck {
                label,
                printed,
                computed,
                difference,
                within_tolerance,
            })
        })
        .collect();

    let mut row_warnings = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        for issue in row_issues(row, tolerance) {
            tracing::warn!(row = i + 1, descripcion = %row.descripcion, %issue, "line item anomaly");
            row_warnings.push(RowWarning {
                row: i + 1,
                descripcion: row.descripcion.clone(),
                issue,
            });
        }
    }

    Reconciliation {
        checks,
        row_warnings,
    }
}

fn row_issues(row: &PricedRow, tolerance: Decimal) -> Vec<RowIssue> {
    let mut issues = Vec::new();

    if row.overflowed {
        issues.push(RowIssue::ArithmeticOverflow);
    }
    if row.cantidad.is_none() {
        issues.push(RowIssue::MissingCantidad);
    }
    if row.precio_unit.is_none() {
        issues.push(RowIssue::MissingPrecioUnit);
    }

    let expected = row.precio_lista.and_then(|lista| {
        let factor = Decimal::ONE.checked_sub(row.pct_desc.checked_div(Decimal::ONE_HUNDRED)?)?;
        lista.checked_mul(factor).map(round_price)
    });
    if let Some(expected) = expected {
        let off = expected
            .checked_sub(row.importe)
            .map_or(true, |d| d.abs() > tolerance);
        if off {
            issues.push(RowIssue::ImporteMismatch {
                expected,
                printed: row.importe,
            });
        }
    }

    let known = [Decimal::from(21), Decimal::new(105, 1), Decimal::ZERO];
    if !known.contains(&row.pct_iva) {
        issues.push(RowIssue::UnknownIvaRate { rate: row.pct_iva });
    }

    issues
}
