//! Word template analysis and persistence
//!
//! A template is an ordinary .docx whose styles, numbering, theme and page
//! geometry define the look of converted output. Analysis runs two passes
//! over the container and produces a `WordDocumentInfo` that the style mapper
//! and writer consume read-only.

pub mod analyzer;
pub mod library;
pub mod models;
pub(crate) mod xml;

pub use analyzer::{TemplateAnalysis, analyze_template, analyze_template_bytes};
pub use library::{ContentStructure, TemplateLibrary, TemplateRecord};
pub use models::{
    Alignment, NumberingDefinition, PageSetup, StyleKind, WordDocumentInfo, WordStyleInfo,
    cm_to_twips, twips_to_cm,
};
