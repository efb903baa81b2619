//! Mapping-table data types

use serde::{Deserialize, Serialize};

/// Closed set of Markdown element families the mapper can style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownElementType {
    /// ATX heading level 1 through 6.
    Heading(u8),
    Paragraph,
    UnorderedList,
    OrderedList,
    Quote,
    CodeBlock,
    Table,
    // Academic-specific elements, matched against academic keyword lists and
    // registered at higher priority than the generic families.
    AbstractTitle,
    AbstractBody,
    Keywords,
    ChapterTitle,
    ReferencesTitle,
    ReferenceItem,
    TocTitle,
    TocEntry,
}

impl MarkdownElementType {
    pub fn is_academic(self) -> bool {
        matches!(
            self,
            MarkdownElementType::AbstractTitle
                | MarkdownElementType::AbstractBody
                | MarkdownElementType::Keywords
                | MarkdownElementType::ChapterTitle
                | MarkdownElementType::ReferencesTitle
                | MarkdownElementType::ReferenceItem
                | MarkdownElementType::TocTitle
                | MarkdownElementType::TocEntry
        )
    }
}

/// A weighted edge from a Markdown element type to a template style name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleMapping {
    pub element: MarkdownElementType,
    /// Template style name to apply.
    pub style_name: String,
    /// Higher wins among mappings registered for the same element type.
    pub priority: i32,
    /// Named context predicates that must all hold for the mapping to apply.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Applied at priority 0 when `conditions` fail.
    #[serde(default)]
    pub fallback_style: Option<String>,
}

impl StyleMapping {
    pub fn new(
        element: MarkdownElementType,
        style_name: impl Into<String>,
        priority: i32,
    ) -> Self {
        StyleMapping {
            element,
            style_name: style_name.into(),
            priority,
            conditions: Vec::new(),
            fallback_style: None,
        }
    }
}

/// Regex-over-text override checked before the priority table.
#[derive(Debug, Clone)]
pub struct ContextualRule {
    pub pattern: regex::Regex,
    pub style_name: String,
}
