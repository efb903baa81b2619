//! mdocx: Markdown to Word conversion driven by template styles
//!
//! The pipeline analyzes loosely-structured academic Markdown (Chinese thesis
//! conventions included), extracts the complete style inventory of a .docx
//! template, maps Markdown elements onto template styles, and emits a Word
//! document in canonical academic order.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod convert;
pub mod diagram;
pub mod error;
pub mod mapping;
pub mod template;

// Re-export commonly used types
pub use analysis::{ContentSection, DocumentStructure, DocumentType, SectionType, analyze_document};
pub use batch::{BatchReport, convert_directory};
pub use config::Config;
pub use convert::{ConversionOptions, ConversionReport, Converter};
pub use error::{ConvertError, ConvertResult, ExtractionWarning};
pub use mapping::{MarkdownElementType, StyleMapper};
pub use template::{TemplateLibrary, WordDocumentInfo, analyze_template};
