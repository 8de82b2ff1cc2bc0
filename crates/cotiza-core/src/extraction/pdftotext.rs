use crate::config::PdftotextConfig;
use crate::error::CotizaError;
use crate::extraction::{PageContent, PdfExtractor};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so that table columns stay aligned and the
/// grid can be recovered from character positions.
pub struct PdftotextExtractor {
    binary: PathBuf,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::from_config(&PdftotextConfig::default())
    }

    pub fn from_config(config: &PdftotextConfig) -> Self {
        PdftotextExtractor {
            binary: config.binary.clone(),
        }
    }

    /// Check if the configured pdftotext binary is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    fn run_layout(&self, pdf_path: &Path) -> Result<String, CotizaError> {
        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(pdf_path)
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CotizaError::PdftotextNotFound
                } else {
                    CotizaError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(CotizaError::PdftotextFailed { code, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, CotizaError> {
        // The temp file is removed when `tmpfile` drops, on every exit path.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| CotizaError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| CotizaError::Extraction(e.to_string()))?;
        tmpfile
            .flush()
            .map_err(|e| CotizaError::Extraction(e.to_string()))?;

        let text = self.run_layout(tmpfile.path())?;
        let pages = split_pages(&text);
        tracing::debug!(
            backend = self.backend_name(),
            pages = pages.len(),
            "extracted page text"
        );
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages on the form feed separator.
///
/// pdftotext terminates the last page with a form feed too, so the trailing
/// empty chunk is dropped. Page 1 is always kept.
fn split_pages(text: &str) -> Vec<PageContent> {
    text.split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: page_text.lines().map(|l| l.to_string()).collect(),
        })
        .filter(|p| !p.lines.is_empty() || p.page_number == 1)
        .collect()
}
