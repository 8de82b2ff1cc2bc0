use serde::{Deserialize, Serialize};

use crate::error::CotizaError;
use crate::extraction::table::RawGrid;
use crate::model::{Column, QuoteRow};
use crate::parsing::values::coerce_number;

/// One named column of the normalized table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColumn {
    pub name: String,
    pub values: Vec<String>,
}

/// Rectangular table keyed by header name.
///
/// All columns have the same number of values. Deserialized tables go
/// through `from_columns` so they are padded too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableRepr")]
pub struct NormalizedTable {
    columns: Vec<NamedColumn>,
}

#[derive(Deserialize)]
struct TableRepr {
    columns: Vec<NamedColumn>,
}

impl From<TableRepr> for NormalizedTable {
    fn from(repr: TableRepr) -> Self {
        NormalizedTable::from_columns(repr.columns.into_iter().map(|c| (c.name, c.values)))
    }
}

impl NormalizedTable {
    /// Build a table from named columns, right-padding shorter columns with
    /// empty strings. A repeated name replaces the earlier column's values.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let mut named: Vec<NamedColumn> = Vec::new();
        for (name, values) in columns {
            let name = name.into();
            match named.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.values = values,
                None => named.push(NamedColumn { name, values }),
            }
        }

        let n_rows = named.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut named {
            col.values.resize(n_rows, String::new());
        }

        NormalizedTable { columns: named }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    /// Values of the column whose header matches `column`.
    pub fn column(&self, column: Column) -> Result<&[String], CotizaError> {
        self.columns
            .iter()
            .find(|c| Column::from_header(&c.name) == Some(column))
            .map(|c| c.values.as_slice())
            .ok_or(CotizaError::MissingColumn { column })
    }

    /// Fail on the first required column that is absent.
    pub fn validate(&self) -> Result<(), CotizaError> {
        for column in Column::REQUIRED {
            self.column(column)?;
        }
        Ok(())
    }

    /// Coerce every row into typed values.
    ///
    /// Percentages and Importe default to zero when they do not parse;
    /// Cantidad and Precio Unit stay missing.
    pub fn quote_rows(&self) -> Result<Vec<QuoteRow>, CotizaError> {
        let descripcion = self.column(Column::DescripcionArticulo)?;
        let desc_adicional = self.column(Column::DescAdicional)?;
        let cantidad = self.column(Column::Cantidad)?;
        let precio_unit = self.column(Column::PrecioUnit)?;
        let pct_desc = self.column(Column::PctDesc)?;
        let pct_iva = self.column(Column::PctIva)?;
        let importe = self.column(Column::Importe)?;

        let rows = (0..self.row_count())
            .map(|i| QuoteRow {
                descripcion: descripcion[i].clone(),
                desc_adicional: desc_adicional[i].clone(),
                cantidad: coerce_number(&cantidad[i]),
                precio_unit: coerce_number(&precio_unit[i]),
                pct_desc: coerce_number(&pct_desc[i]).unwrap_or_default(),
                pct_iva: coerce_number(&pct_iva[i]).unwrap_or_default(),
                importe: coerce_number(&importe[i]).unwrap_or_default(),
            })
            .collect();
        Ok(rows)
    }
}

/// Reshape a raw grid into a normalized table.
///
/// Row 0 is the header. Each column's data cells are joined with newlines,
/// re-split, trimmed and emptied of blank fragments, so row boundaries come
/// from the text rather than from the grid. Shorter columns are padded at
/// the end.
pub fn normalize_grid(grid: &RawGrid) -> Result<NormalizedTable, CotizaError> {
    let header = grid.header();
    let data = grid.data_rows();

    let columns = header.iter().enumerate().map(|(i, name)| {
        let joined = data
            .iter()
            .map(|row| row.get(i).map(String::as_str).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
        let values: Vec<String> = joined
            .split('\n')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        (name.trim().to_string(), values)
    });

    let table = NormalizedTable::from_columns(columns);
    table.validate()?;

    tracing::debug!(
        columns = table.columns().len(),
        rows = table.row_count(),
        "normalized table"
    );
    Ok(table)
}
