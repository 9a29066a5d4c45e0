//! Text extraction for uploaded documents.
//!
//! Supports `.txt` (UTF-8 or Windows-1252) and `.pdf`. Extraction never
//! fails: PDF errors, including parser panics, become a diagnostic string
//! that is then classified like any other text.
//! Unsupported formats and empty content are rejected up front as
//! [`InputError`]s.

use std::fmt;
use std::panic::{self, UnwindSafe};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::InputError;

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Txt,
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from a file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self, InputError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            _ => Err(InputError::UnsupportedFormat(filename.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Txt => f.write_str("txt"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Extract text from document bytes. Line structure is preserved.
pub fn extract_text(content: &[u8], format: DocumentFormat) -> String {
    match format {
        DocumentFormat::Txt => decode_text(content),
        DocumentFormat::Pdf => extract_pdf(content),
    }
}

/// Decode text bytes: strict UTF-8, then Windows-1252.
///
/// Windows-1252 is the WHATWG decoder for latin-1, cp1252 and iso-8859-1 and
/// maps every byte, so decoding always yields text.
pub fn decode_text(content: &[u8]) -> String {
    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(content) {
        return text.trim_start_matches('\u{feff}').to_string();
    }

    debug!("Text upload is not UTF-8, decoding as windows-1252");
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(content);
    text.into_owned()
}

fn extract_pdf(content: &[u8]) -> String {
    pdf_text_or_diagnostic(|| pdf_extract::extract_text_from_mem(content))
}

/// Run a PDF extraction, turning an error or a parser panic into a diagnostic string.
fn pdf_text_or_diagnostic<F, E>(extract: F) -> String
where
    F: FnOnce() -> Result<String, E> + UnwindSafe,
    E: fmt::Display,
{
    match panic::catch_unwind(extract) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF extraction failed");
            format!("Erro ao processar PDF: {e}")
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "falha interna do leitor de PDF".to_string());
            warn!(%reason, "PDF parser panicked");
            format!("Erro ao processar PDF: {reason}")
        }
    }
}

/// Read a file from disk, validate its format and extract its text.
pub fn extract_file(path: &Path) -> Result<String, InputError> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let format = DocumentFormat::from_filename(filename)?;
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), %format, bytes = bytes.len(), "Extracting upload");
    Ok(extract_text(&bytes, format))
}

/// Reject empty or whitespace-only content before it reaches the classifier.
pub fn validate_content(text: &str) -> Result<&str, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(InputError::EmptyContent)
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn format_from_filename() {
        assert_eq!(DocumentFormat::from_filename("email.TXT").unwrap(), DocumentFormat::Txt);
        assert_eq!(DocumentFormat::from_filename("scan.pdf").unwrap(), DocumentFormat::Pdf);
        assert!(matches!(
            DocumentFormat::from_filename("mail.docx"),
            Err(InputError::UnsupportedFormat(name)) if name == "mail.docx"
        ));
        assert!(DocumentFormat::from_filename("noextension").is_err());
    }

    #[test]
    fn decodes_utf8_and_keeps_lines() {
        let text = decode_text("Olá,\nsegue o relatório.".as_bytes());
        assert_eq!(text, "Olá,\nsegue o relatório.");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Oi");
        assert_eq!(decode_text(&bytes), "Oi");
    }

    #[test]
    fn decodes_latin1() {
        // "Olá, ação" in ISO-8859-1.
        let bytes = [0x4F, 0x6C, 0xE1, 0x2C, 0x20, 0x61, 0xE7, 0xE3, 0x6F];
        assert_eq!(decode_text(&bytes), "Olá, ação");
    }

    #[test]
    fn decodes_cp1252_punctuation() {
        // Curly quotes live in the 0x80-0x9F range of cp1252.
        let bytes = [0x93, 0x4F, 0x69, 0x94];
        assert_eq!(decode_text(&bytes), "\u{201c}Oi\u{201d}");
    }

    #[test]
    fn invalid_pdf_yields_diagnostic() {
        let text = extract_text(b"definitely not a pdf", DocumentFormat::Pdf);
        assert!(text.starts_with("Erro ao processar PDF"));
    }

    #[test]
    fn any_byte_sequence_decodes() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode_text(&bytes).chars().count(), 256);
    }

    #[test]
    fn pdf_parser_panic_yields_diagnostic() {
        let text = pdf_text_or_diagnostic(|| -> Result<String, String> {
            panic!("object stream out of range")
        });
        assert_eq!(text, "Erro ao processar PDF: object stream out of range");
    }

    #[test]
    fn pdf_parser_error_yields_diagnostic() {
        let text = pdf_text_or_diagnostic(|| Err::<String, _>("bad xref".to_string()));
        assert_eq!(text, "Erro ao processar PDF: bad xref");
    }

    #[test]
    fn extract_file_reads_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all("EMAIL 1\nPreciso de suporte".as_bytes()).unwrap();

        let text = extract_file(&path).unwrap();
        assert_eq!(text, "EMAIL 1\nPreciso de suporte");
    }

    #[test]
    fn extract_file_rejects_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email.eml");
        std::fs::write(&path, b"From: x").unwrap();
        assert!(matches!(extract_file(&path), Err(InputError::UnsupportedFormat(_))));
    }

    #[test]
    fn extract_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(matches!(extract_file(&path), Err(InputError::Io(_))));
    }

    #[test]
    fn validate_rejects_blank_content() {
        assert!(matches!(validate_content(" \n\t"), Err(InputError::EmptyContent)));
        assert_eq!(validate_content("  oi  ").unwrap(), "oi");
    }
}
