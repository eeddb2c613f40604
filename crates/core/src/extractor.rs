use crate::error::ExtractionError;
use lopdf::Document;
use std::path::Path;

/// Supplies the raw text of a document; the core never parses container formats itself.
pub trait DocumentSource {
    fn extract_raw_text(&self, path: &Path) -> Result<String, ExtractionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfSource;

impl DocumentSource for LopdfSource {
    fn extract_raw_text(&self, path: &Path) -> Result<String, ExtractionError> {
        ensure_pdf_path(path)?;

        let document =
            Document::load(path).map_err(|error| ExtractionError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for page_no in document.get_pages().into_keys() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractionError::PdfParse(error.to_string()))?;
            pages.push(text);
        }

        let text = pages.join("\n");
        if text.trim().is_empty() {
            return Err(ExtractionError::NoExtractableText);
        }

        Ok(text)
    }
}

pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn ensure_pdf_path(path: &Path) -> Result<(), ExtractionError> {
    if is_pdf_path(path) {
        Ok(())
    } else {
        Err(ExtractionError::UnsupportedFormat(path.display().to_string()))
    }
}
