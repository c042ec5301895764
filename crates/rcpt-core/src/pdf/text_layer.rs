//! Embedded text layer extraction using pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::PdfError;

/// Read the PDF's text layer.
///
/// Returns `None` when it has fewer than `min_text_length` non-whitespace
/// characters, which usually means the PDF is a scan.
pub fn text_layer(path: &Path, min_text_length: usize) -> Result<Option<String>> {
    let data = std::fs::read(path)?;
    let data = decrypted_bytes(data)?;

    let text = pdf_extract::extract_text_from_mem(&data)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

    let visible = text.chars().filter(|c| !c.is_whitespace()).count();
    debug!(
        "Text layer of {} has {} visible characters",
        path.display(),
        visible
    );

    if visible < min_text_length || visible == 0 {
        return Ok(None);
    }

    Ok(Some(text))
}

/// Decrypt PDFs protected with an empty user password.
fn decrypted_bytes(data: Vec<u8>) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

    if !doc.is_encrypted() {
        return Ok(data);
    }

    if doc.decrypt("").is_err() {
        return Err(PdfError::Encrypted);
    }
    debug!("Decrypted PDF with empty password");

    let mut decrypted = Vec::new();
    doc.save_to(&mut decrypted)
        .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
    Ok(decrypted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_not_a_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not a PDF").unwrap();

        let err = text_layer(file.path(), 1).unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = text_layer(Path::new("/nonexistent/receipt.pdf"), 1).unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
    }
}
