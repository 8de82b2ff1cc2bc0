use cotiza_core::model::{LineItem, TotalLabel};
use cotiza_core::parsing::ParsedQuotation;
use cotiza_core::pricing::Quotation;
use rust_decimal::Decimal;
use std::fmt::Write;

const MISSING: &str = "-";

fn cell(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}

fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{s}", " ".repeat(width.saturating_sub(len)))
}

/// Render rows as aligned columns. `numeric` marks right-aligned columns.
fn render_grid(headers: &[&str], rows: &[Vec<String>], numeric: &[bool]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.chars().count());
        }
    }

    let render_row = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if numeric.get(i).copied().unwrap_or(false) {
                    pad_left(c, widths[i])
                } else {
                    pad(c, widths[i])
                }
            })
            .collect();
        format!("  {}", parts.join("  ").trim_end())
    };

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&render_row(&header_cells));
    out.push('\n');
    let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "  {}", "-".repeat(rule));
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

fn line_item_cells(item: &LineItem) -> Vec<String> {
    vec![
        item.descripcion.clone(),
        item.desc_adicional.clone(),
        cell(item.cantidad),
        cell(item.precio),
        item.pct_iva.to_string(),
        item.precio_neto.to_string(),
    ]
}

pub fn format_quotation(q: &Quotation, verbose: bool) -> String {
    let mut out = String::new();

    let pct = q.bonus_rate * Decimal::ONE_HUNDRED;
    let _ = writeln!(out, "Bonus rate: {}%\n", pct.round_dp(2).normalize());

    let rows: Vec<Vec<String>> = q.line_items.iter().map(line_item_cells).collect();
    out.push_str(&render_grid(
        &[
            "Descripción Artículo",
            "Desc. Adicional",
            "Cantidad",
            "Precio",
            "% IVA",
            "Precio Neto",
        ],
        &rows,
        &[false, false, true, true, true, true],
    ));
    out.push('\n');

    let summary: Vec<Vec<String>> = q
        .summary
        .iter()
        .map(|l| vec![l.concepto.to_string(), l.importe.to_string()])
        .collect();
    out.push_str(&render_grid(&["Concepto", "Importe"], &summary, &[false, true]));

    if verbose {
        out.push('\n');
        if q.reconciliation.checks.is_empty() {
            out.push_str("Reconciliation: no printed totals to check\n");
        } else {
            out.push_str("Reconciliation:\n");
            for check in &q.reconciliation.checks {
                let marker = if check.within_tolerance { "ok" } else { "MISMATCH" };
                let _ = writeln!(
                    out,
                    "  {:<20} printed {:>12}  computed {:>12}  {}",
                    check.label.to_string(),
                    check.printed,
                    check.computed,
                    marker
                );
            }
        }
        for w in &q.reconciliation.row_warnings {
            let _ = writeln!(out, "  row {} ({}): {}", w.row, w.descripcion, w.issue);
        }
    } else if !q.reconciliation.totals_match() {
        out.push_str("\nwarning: printed totals do not match the line items (use -v for details)\n");
    }

    out.trim_end().to_string()
}

pub fn format_parsed(parsed: &ParsedQuotation) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Table on page {} ({} row(s))\n",
        parsed.table_page,
        parsed.table.row_count()
    );

    let columns = parsed.table.columns();
    let headers: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let rows: Vec<Vec<String>> = (0..parsed.table.row_count())
        .map(|i| {
            columns
                .iter()
                .map(|c| c.values.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    out.push_str(&render_grid(&headers, &rows, &[]));

    out.push_str("\nPrinted totals:\n");
    if parsed.totals.is_empty() {
        out.push_str("  (none found)\n");
    }
    for label in TotalLabel::ALL {
        if let Some(v) = parsed.totals.get(label) {
            let _ = writeln!(out, "  {:<20} {:>12}", label.to_string(), v);
        }
    }

    out.trim_end().to_string()
}
