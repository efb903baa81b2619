//! Section classification
//!
//! Assigns each segmented section a type tag plus a confidence score.
//! Specific lexical matches are tried before keyword sets, which are tried
//! before the structural level-based fallback, so classification never fails:
//! every section ends up with an actionable tag.

use super::models::{ContentSection, DocumentType, SectionType};
use super::patterns;

// Confidence tiers. Tunable; only the ordering exact > keyword > structural
// is load-bearing.
const CONFIDENCE_EXACT: f32 = 0.95;
const CONFIDENCE_STRONG: f32 = 0.9;
const CONFIDENCE_KEYWORD: f32 = 0.85;
const CONFIDENCE_WEAK_KEYWORD: f32 = 0.8;
const CONFIDENCE_FALLBACK_ACADEMIC: f32 = 0.6;
const CONFIDENCE_FALLBACK_GENERAL: f32 = 0.7;

/// Classify every section in place.
pub fn classify_sections(sections: &mut [ContentSection], doc_type: DocumentType) {
    for section in sections.iter_mut() {
        let (section_type, confidence) = classify_section(section, doc_type);
        section.section_type = section_type;
        section.confidence = confidence;
    }
}

/// Classify a single section. First match wins, by descending specificity.
pub fn classify_section(section: &ContentSection, doc_type: DocumentType) -> (SectionType, f32) {
    // Keyword lines often live in the abstract's first lines rather than a
    // heading of their own, so they are searched in the leading content.
    let leading: String = section.content.chars().take(100).collect();

    if patterns::ABSTRACT_CN.is_match(&section.name) {
        return (SectionType::AbstractCn, CONFIDENCE_EXACT);
    }
    if patterns::ABSTRACT_EN.is_match(&section.name) {
        return (SectionType::AbstractEn, CONFIDENCE_EXACT);
    }
    if patterns::KEYWORDS_CN.is_match(&leading) {
        return (SectionType::KeywordsCn, CONFIDENCE_STRONG);
    }
    if patterns::KEYWORDS_EN.is_match(&leading) {
        return (SectionType::KeywordsEn, CONFIDENCE_STRONG);
    }
    if patterns::TOC.is_match(&section.name) {
        return (SectionType::Toc, CONFIDENCE_EXACT);
    }
    if patterns::REFERENCES.is_match(&section.name) {
        return (SectionType::References, CONFIDENCE_EXACT);
    }
    if patterns::APPENDIX.is_match(&section.name) {
        return (SectionType::Appendix, CONFIDENCE_STRONG);
    }
    if patterns::ACKNOWLEDGMENTS.is_match(&section.name) {
        return (SectionType::Acknowledgments, CONFIDENCE_STRONG);
    }

    if doc_type.is_academic() {
        classify_academic(section)
    } else {
        classify_by_level(section, CONFIDENCE_FALLBACK_GENERAL)
    }
}

/// Secondary branch consulted only for academic documents.
fn classify_academic(section: &ContentSection) -> (SectionType, f32) {
    let title = section.name.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

    if contains_any(&["引言", "绪论", "introduction"]) {
        return (SectionType::Introduction, CONFIDENCE_STRONG);
    }
    if contains_any(&["文献综述", "literature review", "相关工作"]) {
        return (SectionType::LiteratureReview, CONFIDENCE_STRONG);
    }
    if contains_any(&["研究方法", "methodology", "实验方法", "方法"]) {
        return (SectionType::Methodology, CONFIDENCE_KEYWORD);
    }
    if contains_any(&["实验结果", "结果", "results"]) {
        return (SectionType::Results, CONFIDENCE_KEYWORD);
    }
    if contains_any(&["讨论", "discussion", "分析"]) {
        return (SectionType::Discussion, CONFIDENCE_WEAK_KEYWORD);
    }
    if contains_any(&["结论", "conclusion"]) {
        return (SectionType::Conclusion, CONFIDENCE_STRONG);
    }
    if contains_any(&["声明", "declaration"]) {
        return (SectionType::Declaration, CONFIDENCE_EXACT);
    }
    if contains_any(&["授权", "authorization"]) {
        return (SectionType::Authorization, CONFIDENCE_EXACT);
    }
    if contains_any(&["封面", "cover", "学位论文"]) {
        if title.contains("english") || title.contains("英文") {
            return (SectionType::EnglishCover, CONFIDENCE_STRONG);
        }
        return (SectionType::CoverPage, CONFIDENCE_STRONG);
    }

    classify_by_level(section, CONFIDENCE_FALLBACK_ACADEMIC)
}

/// Structural fallback: every section gets some tag for style assignment.
fn classify_by_level(section: &ContentSection, confidence: f32) -> (SectionType, f32) {
    let tag = match section.level {
        0 => SectionType::Unknown,
        1 => SectionType::Chapter,
        2 => SectionType::Section,
        _ => SectionType::Subsection,
    };
    (tag, confidence)
}
