//! Core data structures for document structure analysis
//!
//! These types are produced once per analysis pass: the segmenter creates the
//! sections, the classifier annotates them, and everything downstream treats
//! them as read-only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Whole-document classification driving the secondary classifier branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    AcademicThesis,
    ResearchPaper,
    TechnicalReport,
    BusinessReport,
    GeneralDocument,
}

impl DocumentType {
    pub fn is_academic(self) -> bool {
        matches!(self, DocumentType::AcademicThesis | DocumentType::ResearchPaper)
    }
}

/// Closed taxonomy of academic document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    CoverPage,
    EnglishCover,
    Declaration,
    Authorization,
    AbstractCn,
    AbstractEn,
    KeywordsCn,
    KeywordsEn,
    Toc,
    Introduction,
    LiteratureReview,
    Methodology,
    Results,
    Discussion,
    Conclusion,
    References,
    Appendix,
    Acknowledgments,
    Chapter,
    Section,
    Subsection,
    Unknown,
}

impl SectionType {
    /// Structural tags carry no semantic meaning beyond heading depth.
    pub fn is_generic(self) -> bool {
        matches!(
            self,
            SectionType::Chapter | SectionType::Section | SectionType::Subsection | SectionType::Unknown
        )
    }
}

/// One titled, contiguous span of the source document.
///
/// Line ranges are half-open `[start_line, end_line)` over the normalized
/// input; consecutive sections tile the input with no gaps or overlaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    /// Heading text, or a synthetic "前言" label for untitled leading content.
    pub name: String,
    /// Full raw text including the heading line.
    pub content: String,
    pub section_type: SectionType,
    /// Heading depth: 0 for the preface, 1..=6 otherwise.
    pub level: u8,
    pub start_line: usize,
    pub end_line: usize,
    /// Classification certainty in [0, 1]. Generic level-based fallback sits
    /// around 0.6; exact pattern matches reach 0.95.
    pub confidence: f32,
}

impl ContentSection {
    /// Content with the heading line removed.
    pub fn body(&self) -> &str {
        match self.content.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        }
    }
}

/// Summary statistics over the analyzed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub total_characters: usize,
    pub total_words: usize,
    pub total_lines: usize,
    pub total_sections: usize,
    pub sections_by_type: BTreeMap<SectionType, usize>,
    pub sections_by_level: BTreeMap<u8, usize>,
    pub has_citations: bool,
    pub has_figures: bool,
    pub has_tables: bool,
    pub has_code: bool,
    pub has_urls: bool,
    pub has_emails: bool,
}

/// Aggregate result of a full analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub document_type: DocumentType,
    pub sections: Vec<ContentSection>,
    /// Section types recognized with a specific (non-generic) tag.
    pub detected_components: BTreeSet<SectionType>,
    pub statistics: DocumentStatistics,
    /// Mean section confidence, capped at 1.0.
    pub confidence_score: f32,
}

impl DocumentStructure {
    /// Content of the first section carrying the given tag, if any.
    pub fn content_for(&self, section_type: SectionType) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.section_type == section_type)
            .map(|s| s.content.as_str())
    }
}
