use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CotizaError;
use crate::model::{QuoteRow, TotalLabel};
use crate::parsing::columns::NormalizedTable;
use crate::parsing::totals::TotalsMap;
use crate::pricing::outcome::{PricedRow, PricingOutcome, SummaryTotals};

/// Decimal places for every rounded output value.
pub const PRICE_DP: u32 = 2;

pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn iva_general() -> Decimal {
    Decimal::from(21)
}

fn iva_reducido() -> Decimal {
    Decimal::new(105, 1)
}

/// Price every row of the table against the printed totals.
///
/// The only failure is a missing required column; row-level anomalies
/// become missing values instead. A row whose arithmetic overflows, or
/// whose amounts would overflow the document totals, is flagged and left
/// out of the summary.
pub fn price(table: &NormalizedTable, totals: &TotalsMap) -> Result<PricingOutcome, CotizaError> {
    let quote_rows = table.quote_rows()?;
    let bonus_rate = bonus_rate(totals);

    let mut rows: Vec<PricedRow> = quote_rows
        .iter()
        .map(|row| price_row(row, bonus_rate))
        .collect();

    let (summary, excluded) = accumulate(&rows);
    for i in excluded {
        rows[i] = rows[i].clone().into_overflowed();
    }

    tracing::debug!(%bonus_rate, rows = rows.len(), total = %summary.total, "priced quotation");

    Ok(PricingOutcome {
        bonus_rate,
        rows,
        summary,
    })
}

/// Bonificación ÷ Subtotal Cotización.
///
/// Zero when either total is missing or the subtotal is zero. A ratio
/// outside [0, 1) is not a usable rebate and is also replaced by zero.
pub fn bonus_rate(totals: &TotalsMap) -> Decimal {
    let (Some(bonificacion), Some(subtotal)) = (
        totals.get(TotalLabel::Bonificacion),
        totals.get(TotalLabel::SubtotalCotizacion),
    ) else {
        return Decimal::ZERO;
    };

    let Some(rate) = bonificacion.checked_div(subtotal) else {
        return Decimal::ZERO;
    };

    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        tracing::warn!(
            %bonificacion,
            %subtotal,
            %rate,
            "bonus rate outside [0, 1), ignoring it"
        );
        return Decimal::ZERO;
    }

    rate
}

/// Precio Neto, IVA Calculado and Precio con Impuestos, or `None` on overflow.
fn net_chain(importe: Decimal, pct_iva: Decimal, bonus_rate: Decimal) -> Option<[Decimal; 3]> {
    let precio_neto = importe.checked_mul(Decimal::ONE - bonus_rate)?;
    let iva_calculado = precio_neto.checked_mul(pct_iva.checked_div(Decimal::ONE_HUNDRED)?)?;
    let precio_con_impuestos = precio_neto.checked_add(iva_calculado)?;
    Some([precio_neto, iva_calculado, precio_con_impuestos])
}

/// Derive every monetary column of one row.
///
/// Precio Neto is the printed Importe less the document-wide bonus.
pub fn price_row(row: &QuoteRow, bonus_rate: Decimal) -> PricedRow {
    let precio_lista = match (row.cantidad, row.precio_unit) {
        (Some(c), Some(p)) => c.checked_mul(p),
        _ => None,
    };

    let priced = PricedRow {
        descripcion: row.descripcion.clone(),
        desc_adicional: row.desc_adicional.clone(),
        cantidad: row.cantidad,
        precio_unit: row.precio_unit,
        pct_desc: row.pct_desc,
        pct_iva: row.pct_iva,
        importe: row.importe,
        precio_lista,
        precio_neto: Decimal::ZERO,
        precio_neto_unitario: None,
        iva_calculado: Decimal::ZERO,
        precio_con_impuestos: Decimal::ZERO,
        overflowed: false,
    };

    let Some([precio_neto, iva_calculado, precio_con_impuestos]) =
        net_chain(row.importe, row.pct_iva, bonus_rate)
    else {
        return priced.into_overflowed();
    };

    PricedRow {
        precio_neto,
        precio_neto_unitario: row.cantidad.and_then(|c| precio_neto.checked_div(c)),
        iva_calculado,
        precio_con_impuestos,
        ..priced
    }
}

/// Running sums before rounding.
#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    subtotal: Decimal,
    iva_21: Decimal,
    iva_105: Decimal,
    total: Decimal,
}

impl Sums {
    /// Add one row, or `None` if any sum would overflow.
    fn add(&self, row: &PricedRow) -> Option<Sums> {
        let band = |rate: Decimal, sum: Decimal| -> Option<Decimal> {
            if row.pct_iva == rate {
                sum.checked_add(row.precio_neto.checked_mul(rate / Decimal::ONE_HUNDRED)?)
            } else {
                Some(sum)
            }
        };
        Some(Sums {
            subtotal: self.subtotal.checked_add(row.precio_neto)?,
            iva_21: band(iva_general(), self.iva_21)?,
            iva_105: band(iva_reducido(), self.iva_105)?,
            total: self.total.checked_add(row.precio_con_impuestos)?,
        })
    }

    fn rounded(&self) -> SummaryTotals {
        SummaryTotals {
            subtotal: round_price(self.subtotal),
            iva_21: round_price(self.iva_21),
            iva_105: round_price(self.iva_105),
            total: round_price(self.total),
        }
    }
}

/// Sum the rows, skipping overflowed rows and any row whose amounts would
/// overflow a sum. Returns the indices of the rows left out by overflow.
fn accumulate(rows: &[PricedRow]) -> (SummaryTotals, Vec<usize>) {
    let mut sums = Sums::default();
    let mut excluded = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if row.overflowed {
            continue;
        }
        match sums.add(row) {
            Some(next) => sums = next,
            None => {
                tracing::warn!(
                    row = i + 1,
                    descripcion = %row.descripcion,
                    "row amounts overflow the document totals, leaving it out"
                );
                excluded.push(i);
            }
        }
    }

    (sums.rounded(), excluded)
}

/// Aggregate priced rows into the four summary values.
///
/// VAT bands are selected by exact rate equality. Overflowed rows do not
/// count.
pub fn summarize(rows: &[PricedRow]) -> SummaryTotals {
    accumulate(rows).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote_row(cantidad: Option<Decimal>, importe: Decimal, pct_iva: Decimal) -> QuoteRow {
        QuoteRow {
            descripcion: "Item".into(),
            desc_adicional: String::new(),
            cantidad,
            precio_unit: Some(dec!(10)),
            pct_desc: Decimal::ZERO,
            pct_iva,
            importe,
        }
    }

    fn totals(subtotal: Option<Decimal>, bonificacion: Option<Decimal>) -> TotalsMap {
        let mut t = TotalsMap::new();
        if let Some(s) = subtotal {
            t.insert(TotalLabel::SubtotalCotizacion, s);
        }
        if let Some(b) = bonificacion {
            t.insert(TotalLabel::Bonificacion, b);
        }
        t
    }

    #[test]
    fn test_bonus_rate_ratio() {
        assert_eq!(bonus_rate(&totals(Some(dec!(200)), Some(dec!(20)))), dec!(0.1));
    }

    #[test]
    fn test_bonus_rate_missing_labels() {
        assert_eq!(bonus_rate(&totals(None, Some(dec!(20)))), Decimal::ZERO);
        assert_eq!(bonus_rate(&totals(Some(dec!(200)), None)), Decimal::ZERO);
        assert_eq!(bonus_rate(&TotalsMap::new()), Decimal::ZERO);
    }

    #[test]
    fn test_bonus_rate_zero_subtotal() {
        assert_eq!(bonus_rate(&totals(Some(dec!(0)), Some(dec!(20)))), Decimal::ZERO);
    }

    #[test]
    fn test_bonus_rate_out_of_range() {
        assert_eq!(bonus_rate(&totals(Some(dec!(100)), Some(dec!(100)))), Decimal::ZERO);
        assert_eq!(bonus_rate(&totals(Some(dec!(100)), Some(dec!(150)))), Decimal::ZERO);
    }

    #[test]
    fn test_price_row_uses_printed_importe() {
        let mut row = quote_row(Some(dec!(2)), dec!(80), dec!(21));
        row.precio_unit = Some(dec!(50));
        row.pct_desc = dec!(20);
        let priced = price_row(&row, dec!(0.1));
        assert_eq!(priced.precio_lista, Some(dec!(100)));
        assert_eq!(priced.precio_neto, dec!(72));
        assert_eq!(priced.precio_neto_unitario, Some(dec!(36)));
        assert_eq!(priced.iva_calculado, dec!(15.12));
        assert_eq!(priced.precio_con_impuestos, dec!(87.12));
    }

    #[test]
    fn test_missing_cantidad_propagates() {
        let priced = price_row(&quote_row(None, dec!(100), dec!(21)), Decimal::ZERO);
        assert_eq!(priced.precio_lista, None);
        assert_eq!(priced.precio_neto_unitario, None);
        assert_eq!(priced.precio_neto, dec!(100));
        assert_eq!(priced.line_item().precio, None);
    }

    #[test]
    fn test_zero_cantidad_is_missing_unit_price() {
        let priced = price_row(&quote_row(Some(dec!(0)), dec!(100), dec!(21)), Decimal::ZERO);
        assert_eq!(priced.precio_lista, Some(dec!(0)));
        assert_eq!(priced.precio_neto_unitario, None);
    }

    #[test]
    fn test_tax_forms_agree() {
        let priced = price_row(&quote_row(Some(dec!(3)), dec!(123.457), dec!(10.5)), dec!(0.07));
        let direct = priced.precio_neto * (Decimal::ONE + priced.pct_iva / Decimal::ONE_HUNDRED);
        assert_eq!(
            round_price(priced.precio_con_impuestos),
            round_price(direct)
        );
    }

    #[test]
    fn test_summarize_bands_exact_match() {
        let rows: Vec<PricedRow> = [
            quote_row(Some(dec!(1)), dec!(100), dec!(21)),
            quote_row(Some(dec!(1)), dec!(100), dec!(21.0)),
            quote_row(Some(dec!(1)), dec!(100), dec!(10.5)),
            quote_row(Some(dec!(1)), dec!(100), dec!(27)),
        ]
        .iter()
        .map(|r| price_row(r, Decimal::ZERO))
        .collect();
        let s = summarize(&rows);
        assert_eq!(s.subtotal, dec!(400));
        assert_eq!(s.iva_21, dec!(42));
        assert_eq!(s.iva_105, dec!(10.5));
        assert_eq!(s.total, dec!(479.5));
    }

    #[test]
    fn test_row_arithmetic_overflow_is_flagged() {
        let huge = Decimal::MAX;
        let priced = price_row(&quote_row(Some(dec!(1)), huge, dec!(21)), Decimal::ZERO);
        assert!(priced.overflowed);
        assert_eq!(priced.precio_neto, Decimal::ZERO);
        assert_eq!(priced.precio_neto_unitario, None);
        assert_eq!(priced.precio_con_impuestos, Decimal::ZERO);
    }

    #[test]
    fn test_price_survives_summary_overflow() {
        let huge = "50000000000000000000000000000".to_string();
        let table = NormalizedTable::from_columns(vec![
            ("Descripción Artículo", vec!["A".to_string(), "B".to_string(), "C".to_string()]),
            ("Desc. Adicional", vec![String::new(), String::new(), String::new()]),
            ("Cantidad", vec!["1".to_string(), "1".to_string(), "2".to_string()]),
            ("Precio Unit", vec![String::new(), String::new(), "50".to_string()]),
            ("% Desc.", vec!["0".to_string(), "0".to_string(), "0".to_string()]),
            ("% IVA", vec!["0".to_string(), "0".to_string(), "21".to_string()]),
            ("Importe", vec![huge.clone(), huge, "100".to_string()]),
        ]);

        let outcome = price(&table, &TotalsMap::new()).unwrap();
        assert_eq!(outcome.rows.len(), 3);
        assert!(!outcome.rows[0].overflowed);
        assert!(outcome.rows[1].overflowed);
        assert!(!outcome.rows[2].overflowed);
        assert_eq!(outcome.summary.subtotal, dec!(50000000000000000000000000100));
        assert_eq!(outcome.summary.iva_21, dec!(21));
        assert_eq!(outcome.summary, summarize(&outcome.rows));
    }

    #[test]
    fn test_round_price_midpoint_away_from_zero() {
        assert_eq!(round_price(dec!(2.675)), dec!(2.68));
        assert_eq!(round_price(dec!(2.665)), dec!(2.67));
        assert_eq!(round_price(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_price_missing_column() {
        let table = NormalizedTable::from_columns(vec![("Cantidad", vec!["1".to_string()])]);
        assert!(matches!(
            price(&table, &TotalsMap::new()),
            Err(CotizaError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_price_is_idempotent() {
        let table = NormalizedTable::from_columns(vec![
            ("Descripción Artículo", vec!["A".to_string(), "B".to_string()]),
            ("Desc. Adicional", vec![String::new(), String::new()]),
            ("Cantidad", vec!["3".to_string(), "7".to_string()]),
            ("Precio Unit", vec!["33.33".to_string(), "1.1".to_string()]),
            ("% Desc.", vec!["0".to_string(), "5".to_string()]),
            ("% IVA", vec!["21".to_string(), "10.5".to_string()]),
            ("Importe", vec!["99.99".to_string(), "7.32".to_string()]),
        ]);
        let t = totals(Some(dec!(107.31)), Some(dec!(3.33)));
        assert_eq!(price(&table, &t).unwrap(), price(&table, &t).unwrap());
    }
}
