use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CotizaError;

/// Settings for one pipeline run.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pdftotext: PdftotextConfig,
    pub table: TableSettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdftotextConfig {
    /// Path or name of the pdftotext binary.
    pub binary: PathBuf,
}

impl Default for PdftotextConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftotext"),
        }
    }
}

/// Knobs for recovering the table grid from layout text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Minimum run of spaces that separates two cells on a line.
    pub column_gap: usize,
    /// How many known column names a line needs to count as a table header.
    pub min_header_columns: usize,
    /// Consecutive blank lines that close a table.
    pub max_blank_lines: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            column_gap: 2,
            min_header_columns: 3,
            max_blank_lines: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Largest absolute difference still reported as a match.
    pub tolerance: Decimal,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<PipelineConfig, CotizaError> {
        let content = std::fs::read_to_string(path).map_err(|e| CotizaError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| CotizaError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a config from a TOML string (no file path context).
    pub fn from_toml_str(s: &str) -> Result<PipelineConfig, CotizaError> {
        toml::from_str(s).map_err(|e| CotizaError::ConfigParse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, CotizaError> {
        toml::to_string_pretty(self).map_err(|e| CotizaError::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_empty_toml_is_default() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.table.column_gap, 2);
        assert_eq!(cfg.reconcile.tolerance, dec!(0.01));
    }

    #[test]
    fn test_partial_override() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
[table]
min_header_columns = 4

[reconcile]
tolerance = "0.5"
"#,
        )
        .unwrap();
        assert_eq!(cfg.table.min_header_columns, 4);
        assert_eq!(cfg.table.column_gap, 2);
        assert_eq!(cfg.reconcile.tolerance, dec!(0.5));
        assert_eq!(cfg.pdftotext.binary, PathBuf::from("pdftotext"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml_str("[table]\ncolumn_gap = \"wide\""),
            Err(CotizaError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pdftotext]\nbinary = \"/opt/poppler/bin/pdftotext\"").unwrap();
        let cfg = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(
            cfg.pdftotext.binary,
            PathBuf::from("/opt/poppler/bin/pdftotext")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/cotiza.toml")).unwrap_err();
        assert!(matches!(err, CotizaError::Config { .. }));
    }

    #[test]
    fn test_default_serializes_and_parses_back() {
        let text = PipelineConfig::default().to_toml_string().unwrap();
        let cfg = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }
}
