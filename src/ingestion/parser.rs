//! File parsing: best-effort text linearization of uploaded documents.
//!
//! No OCR, no table or layout extraction. PDF pages that yield no text are
//! treated as empty rather than failing the upload.

use crate::errors::AppError;

/// Supported upload types, derived from the declared file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
}

impl FileType {
    /// Case-insensitive extension lookup. Unrecognized extensions are
    /// rejected before any parsing is attempted.
    pub fn from_extension(ext: &str) -> Result<Self, AppError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            other => Err(AppError::UnsupportedFileType(other.to_string())),
        }
    }

    /// Extension of `filename`, or an UnsupportedFileType error when there
    /// is none.
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let ext = filename
            .rsplit('.')
            .next()
            .filter(|e| *e != filename)
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

/// Extract plain text from the raw upload bytes. The result is trimmed of
/// leading and trailing whitespace for every format.
pub fn extract_text(file_type: FileType, data: &[u8]) -> Result<String, AppError> {
    let text = match file_type {
        FileType::Pdf => extract_pdf(data)?,
        FileType::Docx => extract_docx(data)?,
        FileType::Txt => extract_txt(data)?,
    };
    Ok(text.trim().to_string())
}

/// Concatenated per-page text. pdf-extract skips pages without extractable
/// text on its own.
fn extract_pdf(data: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::DocumentParse(format!("PDF: {}", e)))
}

/// Non-empty paragraph text joined by newlines.
fn extract_docx(data: &[u8]) -> Result<String, AppError> {
    let doc = docx_rs::read_docx(data)
        .map_err(|e| AppError::DocumentParse(format!("DOCX: {}", e)))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            let mut paragraph = String::new();
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            paragraph.push_str(&t.text);
                        }
                    }
                }
            }
            if !paragraph.is_empty() {
                paragraphs.push(paragraph);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

fn extract_txt(data: &[u8]) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map_err(|e| AppError::DocumentParse(format!("TXT is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(FileType::from_extension("PDF").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_extension("Docx").unwrap(), FileType::Docx);
        assert_eq!(FileType::from_extension("txt").unwrap(), FileType::Txt);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = FileType::from_extension("exe").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType(_)));
    }

    #[test]
    fn filename_without_extension_is_rejected() {
        assert!(FileType::from_filename("notes").is_err());
        assert!(FileType::from_filename("notes.txt").is_ok());
        assert_eq!(
            FileType::from_filename("report.final.PDF").unwrap(),
            FileType::Pdf
        );
    }

    #[test]
    fn txt_extraction_trims_whitespace() {
        let text = extract_text(FileType::Txt, b"  hello\nworld\n\n").unwrap();
        assert_eq!(text, "hello\nworld");
    }

    #[test]
    fn invalid_utf8_txt_fails_with_parse_error() {
        let err = extract_text(FileType::Txt, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, AppError::DocumentParse(_)));
    }
}
