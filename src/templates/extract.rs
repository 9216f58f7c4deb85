//! Text extraction for stored template content.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use super::model::{SourceFormat, TemplateContent};
use crate::generators::GeneratorError;

pub trait TextExtractor: Send + Sync {
    /// Readable text of `content`, or `UnsupportedFormat` when it cannot be
    /// read.
    fn extract(&self, content: &TemplateContent) -> Result<String, GeneratorError>;
}

/// Reads plain text directly and converts word-processing documents with
/// pandoc, when a pandoc binary is configured.
#[derive(Debug, Clone, Default)]
pub struct CommandTextExtractor {
    pandoc: Option<PathBuf>,
}

impl CommandTextExtractor {
    pub fn new(pandoc: Option<PathBuf>) -> Self {
        Self { pandoc }
    }

    pub fn supports(&self, format: SourceFormat) -> bool {
        match format {
            SourceFormat::PlainText => true,
            SourceFormat::WordProcessingDocument => self.pandoc.is_some(),
        }
    }

    fn run_pandoc(&self, pandoc: &PathBuf, data: &[u8]) -> Result<String, GeneratorError> {
        let io_err = |e: std::io::Error| GeneratorError::UnsupportedFormat(e.to_string());

        let mut file = tempfile::Builder::new()
            .suffix(".docx")
            .tempfile()
            .map_err(io_err)?;
        file.write_all(data).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        let mut cmd = Command::new(pandoc);
        cmd.arg(file.path())
            .arg("--from=docx")
            .arg("--to=plain")
            .arg("--wrap=none");

        log::debug!("Running pandoc: {:?}", cmd);
        let output = cmd.output().map_err(io_err)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::UnsupportedFormat(format!(
                "pandoc could not read the document: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextExtractor for CommandTextExtractor {
    fn extract(&self, content: &TemplateContent) -> Result<String, GeneratorError> {
        match content.source_format {
            SourceFormat::PlainText => {
                let text = std::str::from_utf8(&content.data).map_err(|_| {
                    GeneratorError::UnsupportedFormat("template is not UTF-8 text".to_string())
                })?;
                Ok(text.trim_start_matches('\u{feff}').to_string())
            }
            SourceFormat::WordProcessingDocument => match &self.pandoc {
                Some(pandoc) => self.run_pandoc(pandoc, &content.data),
                None => Err(GeneratorError::UnsupportedFormat(
                    "word-processing documents need PANDOC_BIN to be configured".to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(data: &[u8], source_format: SourceFormat) -> TemplateContent {
        TemplateContent {
            data: data.to_vec(),
            source_format,
        }
    }

    #[test]
    fn test_plain_text_strips_bom() {
        let extractor = CommandTextExtractor::default();
        let text = extractor
            .extract(&content("\u{feff}Xin chào [NAME]".as_bytes(), SourceFormat::PlainText))
            .unwrap();
        assert_eq!(text, "Xin chào [NAME]");
    }

    #[test]
    fn test_invalid_utf8_is_unsupported() {
        let extractor = CommandTextExtractor::default();
        let err = extractor
            .extract(&content(&[0xff, 0xfe, 0x00], SourceFormat::PlainText))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_docx_without_pandoc_is_unsupported() {
        let extractor = CommandTextExtractor::new(None);
        assert!(!extractor.supports(SourceFormat::WordProcessingDocument));
        let err = extractor
            .extract(&content(b"PK\x03\x04", SourceFormat::WordProcessingDocument))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnsupportedFormat(_)));
    }
}
