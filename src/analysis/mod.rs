//! Markdown document structure analysis
//!
//! Raw text flows through normalization, segmentation, whole-document type
//! detection and per-section classification, producing a `DocumentStructure`
//! that downstream style mapping and assembly consume read-only.

pub mod classifier;
pub mod context;
pub mod detector;
pub mod models;
pub(crate) mod patterns;
pub mod segmenter;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

pub use context::{DocumentContext, Language};
pub use models::{
    ContentSection, DocumentStatistics, DocumentStructure, DocumentType, SectionType,
};

/// Normalize line endings and whitespace before segmentation.
///
/// Line ranges in the analysis result refer to this normalized text.
pub fn normalize_content(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    for line in unified.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            // Collapse runs of blank lines to a single paragraph separator.
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}

/// Run the full analysis pass over raw Markdown text.
pub fn analyze_document(content: &str) -> DocumentStructure {
    let normalized = normalize_content(content);

    let document_type = detector::detect_document_type(&normalized);
    info!(?document_type, "detected document type");

    let mut sections = segmenter::segment(&normalized);
    debug!(count = sections.len(), "segmented sections");

    classifier::classify_sections(&mut sections, document_type);

    let detected_components: BTreeSet<SectionType> = sections
        .iter()
        .map(|s| s.section_type)
        .filter(|t| !t.is_generic())
        .collect();

    let statistics = compute_statistics(&normalized, &sections);

    let confidence_score = if sections.is_empty() {
        0.0
    } else {
        let total: f32 = sections.iter().map(|s| s.confidence).sum();
        (total / sections.len() as f32).min(1.0)
    };

    DocumentStructure {
        document_type,
        sections,
        detected_components,
        statistics,
        confidence_score,
    }
}

fn compute_statistics(content: &str, sections: &[ContentSection]) -> DocumentStatistics {
    let mut sections_by_type: BTreeMap<SectionType, usize> = BTreeMap::new();
    let mut sections_by_level: BTreeMap<u8, usize> = BTreeMap::new();
    for section in sections {
        *sections_by_type.entry(section.section_type).or_default() += 1;
        *sections_by_level.entry(section.level).or_default() += 1;
    }

    DocumentStatistics {
        total_characters: content.chars().count(),
        total_words: content.unicode_words().count(),
        total_lines: content.lines().count(),
        total_sections: sections.len(),
        sections_by_type,
        sections_by_level,
        has_citations: patterns::CITATION.is_match(content),
        has_figures: patterns::FIGURE_REF.is_match(content),
        has_tables: patterns::TABLE_REF.is_match(content),
        has_code: patterns::CODE_BLOCK.is_match(content),
        has_urls: patterns::URL.is_match(content),
        has_emails: patterns::EMAIL.is_match(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_blank_runs() {
        let text = "a\r\n\r\n\r\n\r\nb\r\n";
        assert_eq!(normalize_content(text), "a\n\nb");
    }

    #[test]
    fn abstract_scenario_end_to_end() {
        let input = "# 摘要\n\n内容。\n\n**关键词：** 关键词1；关键词2";
        let structure = analyze_document(input);

        assert_eq!(structure.sections.len(), 1);
        let section = &structure.sections[0];
        assert_eq!(section.name, "摘要");
        assert_eq!(section.section_type, SectionType::AbstractCn);
        assert!(section.confidence >= 0.9);
        assert!(section.content.contains("关键词1；关键词2"));
    }

    #[test]
    fn headingless_text_is_one_unknown_preface() {
        let structure = analyze_document("plain text only");
        assert_eq!(structure.sections.len(), 1);
        assert_eq!(structure.sections[0].level, 0);
        assert_eq!(structure.sections[0].section_type, SectionType::Unknown);
    }

    #[test]
    fn statistics_flags_reflect_content() {
        let input = "# 结果\n\n如图 1 所示，详见表 2 与文献[3]。\n\n```py\nprint(1)\n```";
        let stats = analyze_document(input).statistics;
        assert!(stats.has_figures);
        assert!(stats.has_tables);
        assert!(stats.has_citations);
        assert!(stats.has_code);
        assert!(!stats.has_emails);
    }

    #[test]
    fn detected_components_exclude_generic_tags() {
        let input = "# 摘要\n\n内容。\n\n# 随便一个章节\n\n正文。\n\n# 参考文献\n\n[1] 某某.";
        let structure = analyze_document(input);
        assert!(structure.detected_components.contains(&SectionType::AbstractCn));
        assert!(structure.detected_components.contains(&SectionType::References));
        assert!(!structure.detected_components.contains(&SectionType::Chapter));
    }

    #[test]
    fn content_lookup_by_section_type() {
        let input = "# 摘要\n\n摘要内容。\n\n# 参考文献\n\n[1] 某某.";
        let structure = analyze_document(input);
        assert!(
            structure
                .content_for(SectionType::References)
                .is_some_and(|c| c.contains("[1] 某某."))
        );
        assert!(structure.content_for(SectionType::Toc).is_none());
    }
}
