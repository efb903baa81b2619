//! Conversion orchestration
//!
//! One `Converter` per template: it owns the analyzed template info and drives
//! analysis, mapping, assembly and writing for any number of documents. The
//! template info sits behind an `Arc` so batch mode can fan out over files
//! without re-analyzing the template.

pub mod assembler;
pub mod markdown;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{self, DocumentContext, DocumentType, SectionType};
use crate::error::{ConvertError, ConvertResult};
use crate::mapping::StyleMapper;
use crate::template::WordDocumentInfo;

pub use assembler::{AssembledSection, assemble, expected_components, missing_components};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionOptions {
    /// Fill missing canonical components with bracketed placeholders.
    pub complete_missing: bool,
}

/// Outcome of one successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub template_name: String,
    pub document_type: DocumentType,
    pub section_count: usize,
    /// Canonical components that were filled with placeholder text.
    pub placeholders_inserted: Vec<SectionType>,
    /// Non-blocking problems, human readable.
    pub warnings: Vec<String>,
    pub elapsed_ms: u128,
}

pub struct Converter {
    info: Arc<WordDocumentInfo>,
    options: ConversionOptions,
    /// Warnings inherited from template analysis, surfaced on every report.
    template_warnings: Vec<String>,
}

impl Converter {
    pub fn new(info: Arc<WordDocumentInfo>, options: ConversionOptions) -> Self {
        Converter {
            info,
            options,
            template_warnings: Vec::new(),
        }
    }

    /// Build a converter by analyzing a template file.
    pub async fn from_template(path: &Path, options: ConversionOptions) -> ConvertResult<Self> {
        let analysis = crate::template::analyze_template(path).await?;
        Ok(Converter {
            info: Arc::new(analysis.info),
            options,
            template_warnings: analysis.warnings.iter().map(|w| w.to_string()).collect(),
        })
    }

    pub fn template_info(&self) -> &WordDocumentInfo {
        &self.info
    }

    pub fn share_template(&self) -> Arc<WordDocumentInfo> {
        Arc::clone(&self.info)
    }

    /// Convert one Markdown file to `output`.
    pub async fn convert_file(&self, input: &Path, output: &Path) -> ConvertResult<ConversionReport> {
        if !input.exists() {
            return Err(ConvertError::InputNotFound(input.to_path_buf()));
        }
        let content = tokio::fs::read_to_string(input).await?;
        self.convert_text(&content, output)
    }

    /// Convert Markdown text to `output`.
    pub fn convert_text(&self, content: &str, output: &Path) -> ConvertResult<ConversionReport> {
        let started = Instant::now();

        let structure = analysis::analyze_document(content);
        let context = DocumentContext::analyze(content);
        let mapper = StyleMapper::new(&self.info);

        let mut warnings = self.template_warnings.clone();
        let missing = assembler::missing_components(&structure);
        let placeholders_inserted = if self.options.complete_missing {
            for component in &missing {
                warnings.push(format!("missing component filled with placeholder: {component:?}"));
            }
            missing
        } else {
            for component in &missing {
                warnings.push(format!("expected component not found: {component:?}"));
            }
            Vec::new()
        };

        let assembled = assembler::assemble(&structure, self.options.complete_missing);
        let docx_writer = writer::DocxWriter::new(&self.info, &mapper, &context);
        docx_writer.write(&assembled, output)?;

        for warning in &warnings {
            warn!(%warning, "conversion warning");
        }
        info!(
            output = %output.display(),
            document_type = ?structure.document_type,
            sections = assembled.len(),
            "conversion complete"
        );

        Ok(ConversionReport {
            output_path: output.to_path_buf(),
            template_name: self.info.filename.clone(),
            document_type: structure.document_type,
            section_count: assembled.len(),
            placeholders_inserted,
            warnings,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::WordDocumentInfo;

    fn converter(complete_missing: bool) -> Converter {
        let mut info = WordDocumentInfo::new("fallback.docx");
        info.styles = WordDocumentInfo::fallback_styles();
        Converter::new(Arc::new(info), ConversionOptions { complete_missing })
    }

    #[tokio::test]
    async fn missing_input_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let err = converter(false)
            .convert_file(Path::new("/nonexistent.md"), &dir.path().join("o.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[tokio::test]
    async fn end_to_end_conversion_produces_docx() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("thesis.md");
        tokio::fs::write(&input, "# 摘要\n\n内容。\n\n# 第一章 绪论\n\n正文。")
            .await
            .unwrap();
        let output = dir.path().join("thesis.docx");

        let report = converter(false)
            .convert_file(&input, &output)
            .await
            .unwrap();

        assert!(output.exists());
        assert_eq!(report.section_count, 2);
        assert!(report.placeholders_inserted.is_empty());
    }

    #[tokio::test]
    async fn completion_mode_reports_inserted_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("o.docx");
        let text = "本文为学位论文，硕士研究生学号相关。\n\n# 摘要\n\n内容。\n\n# Abstract\n\ncontent";

        let report = converter(true).convert_text(text, &output).unwrap();
        assert!(report.placeholders_inserted.contains(&SectionType::References));
        assert!(report.warnings.iter().any(|w| w.contains("placeholder")));
    }
}
