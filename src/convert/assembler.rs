//! Canonical-order content assembly
//!
//! Classified sections are reordered into the fixed academic sequence (front
//! matter, body chapters in document order, back matter), page breaks are
//! planned before major divisions, and missing canonical components can be
//! filled with bracketed placeholder text in template-completion mode.

use tracing::debug;

use crate::analysis::{DocumentStructure, DocumentType, SectionType};

/// Front-matter slots, in output order.
const FRONT_MATTER: &[SectionType] = &[
    SectionType::CoverPage,
    SectionType::EnglishCover,
    SectionType::Declaration,
    SectionType::Authorization,
    SectionType::AbstractCn,
    SectionType::KeywordsCn,
    SectionType::AbstractEn,
    SectionType::KeywordsEn,
    SectionType::Toc,
];

/// Back-matter slots, in output order.
const BACK_MATTER: &[SectionType] = &[
    SectionType::References,
    SectionType::Appendix,
    SectionType::Acknowledgments,
];

/// One output unit: a real section or a placeholder standing in for a
/// missing canonical component.
#[derive(Debug, Clone)]
pub struct AssembledSection {
    /// Heading text. None for untitled preface content.
    pub title: Option<String>,
    /// Body text with the heading line removed.
    pub body: String,
    pub section_type: SectionType,
    pub level: u8,
    pub page_break_before: bool,
    pub is_placeholder: bool,
}

/// Canonical components a finished document of this type should carry.
pub fn expected_components(document_type: DocumentType) -> &'static [SectionType] {
    match document_type {
        DocumentType::AcademicThesis => &[
            SectionType::CoverPage,
            SectionType::AbstractCn,
            SectionType::KeywordsCn,
            SectionType::AbstractEn,
            SectionType::KeywordsEn,
            SectionType::Toc,
            SectionType::References,
            SectionType::Acknowledgments,
        ],
        DocumentType::ResearchPaper => &[
            SectionType::AbstractCn,
            SectionType::KeywordsCn,
            SectionType::References,
        ],
        DocumentType::TechnicalReport | DocumentType::BusinessReport => &[SectionType::Toc],
        DocumentType::GeneralDocument => &[],
    }
}

/// Expected components absent from the analysis result.
pub fn missing_components(structure: &DocumentStructure) -> Vec<SectionType> {
    expected_components(structure.document_type)
        .iter()
        .copied()
        .filter(|t| !structure.detected_components.contains(t))
        .collect()
}

/// Reorder sections into canonical academic order.
///
/// With `complete_missing`, absent canonical components are filled with
/// bracketed instructional placeholders at their slots instead of omitted.
pub fn assemble(structure: &DocumentStructure, complete_missing: bool) -> Vec<AssembledSection> {
    let missing = if complete_missing {
        missing_components(structure)
    } else {
        Vec::new()
    };

    let mut out: Vec<AssembledSection> = Vec::with_capacity(structure.sections.len());

    for slot in FRONT_MATTER {
        emit_slot(structure, *slot, &missing, &mut out);
    }

    // Body chapters stay in document order.
    for section in &structure.sections {
        if FRONT_MATTER.contains(&section.section_type)
            || BACK_MATTER.contains(&section.section_type)
        {
            continue;
        }
        out.push(AssembledSection {
            title: (section.level > 0).then(|| section.name.clone()),
            body: section.body().to_string(),
            section_type: section.section_type,
            level: section.level,
            page_break_before: section.level <= 1 && section.level > 0,
            is_placeholder: false,
        });
    }

    for slot in BACK_MATTER {
        emit_slot(structure, *slot, &missing, &mut out);
    }

    // Never start the document with a blank page.
    if let Some(first) = out.first_mut() {
        first.page_break_before = false;
    }

    debug!(
        sections = out.len(),
        placeholders = out.iter().filter(|s| s.is_placeholder).count(),
        "assembly plan built"
    );
    out
}

fn emit_slot(
    structure: &DocumentStructure,
    slot: SectionType,
    missing: &[SectionType],
    out: &mut Vec<AssembledSection>,
) {
    let mut found = false;
    for section in structure.sections.iter().filter(|s| s.section_type == slot) {
        found = true;
        out.push(AssembledSection {
            title: Some(section.name.clone()),
            body: section.body().to_string(),
            section_type: slot,
            level: section.level.max(1),
            page_break_before: breaks_page(slot),
            is_placeholder: false,
        });
    }
    if !found && missing.contains(&slot) {
        out.push(placeholder(slot));
    }
}

/// Major divisions start on a fresh page.
fn breaks_page(section_type: SectionType) -> bool {
    matches!(
        section_type,
        SectionType::CoverPage
            | SectionType::EnglishCover
            | SectionType::Declaration
            | SectionType::Authorization
            | SectionType::AbstractCn
            | SectionType::AbstractEn
            | SectionType::Toc
            | SectionType::References
            | SectionType::Appendix
            | SectionType::Acknowledgments
    )
}

fn placeholder(section_type: SectionType) -> AssembledSection {
    let (title, body) = match section_type {
        SectionType::CoverPage => (Some("封面"), "【请在此处完善封面信息】"),
        SectionType::AbstractCn => (Some("摘要"), "【请在此处写入摘要内容】"),
        SectionType::KeywordsCn => (None, "关键词：【请填写关键词，以分号分隔】"),
        SectionType::AbstractEn => (Some("Abstract"), "【请在此处写入英文摘要内容】"),
        SectionType::KeywordsEn => (None, "Key words: 【请填写英文关键词】"),
        SectionType::Toc => (Some("目录"), "【请在此处插入目录】"),
        SectionType::References => (Some("参考文献"), "【请在此处列出参考文献】"),
        SectionType::Acknowledgments => (Some("致谢"), "【请在此处写入致谢内容】"),
        _ => (None, "【请在此处补充内容】"),
    };
    AssembledSection {
        title: title.map(str::to_string),
        body: body.to_string(),
        section_type,
        level: 1,
        page_break_before: breaks_page(section_type),
        is_placeholder: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_document;

    const THESIS: &str = "\
本文为学位论文，面向硕士研究生学号管理。

# 参考文献

[1] 某某. 某研究[J].

# 摘要

研究了排序问题。

**关键词：** 排序；算法

# Abstract

We study sorting.

# 第一章 绪论

背景介绍。

# 第二章 方法

方法描述。";

    #[test]
    fn sections_reorder_into_canonical_sequence() {
        let structure = analyze_document(THESIS);
        let assembled = assemble(&structure, false);

        let abstract_pos = assembled
            .iter()
            .position(|s| s.section_type == SectionType::AbstractCn)
            .unwrap();
        let references_pos = assembled
            .iter()
            .position(|s| s.section_type == SectionType::References)
            .unwrap();
        let chapter_pos = assembled
            .iter()
            .position(|s| s.title.as_deref() == Some("第一章 绪论"))
            .unwrap();

        assert!(abstract_pos < chapter_pos, "abstract must precede chapters");
        assert!(chapter_pos < references_pos, "references move to back matter");
    }

    #[test]
    fn no_section_types_are_dropped_by_assembly() {
        let structure = analyze_document(THESIS);
        let assembled = assemble(&structure, false);
        for section in &structure.sections {
            assert!(
                assembled.iter().any(|a| a.section_type == section.section_type),
                "{:?} missing from assembly",
                section.section_type
            );
        }
    }

    #[test]
    fn completion_mode_inserts_marked_placeholders() {
        let structure = analyze_document(THESIS);
        let missing = missing_components(&structure);
        assert!(missing.contains(&SectionType::Toc));

        let assembled = assemble(&structure, true);
        let toc = assembled
            .iter()
            .find(|s| s.section_type == SectionType::Toc)
            .expect("placeholder toc");
        assert!(toc.is_placeholder);
        assert!(toc.body.starts_with('【') && toc.body.ends_with('】'));
    }

    #[test]
    fn placeholders_off_means_nothing_added() {
        let structure = analyze_document(THESIS);
        let assembled = assemble(&structure, false);
        assert!(assembled.iter().all(|s| !s.is_placeholder));
    }

    #[test]
    fn chapters_break_pages_but_first_section_does_not() {
        let structure = analyze_document(THESIS);
        let assembled = assemble(&structure, false);
        assert!(!assembled[0].page_break_before);
        let chapter = assembled
            .iter()
            .find(|s| s.title.as_deref() == Some("第二章 方法"))
            .unwrap();
        assert!(chapter.page_break_before);
    }

    #[test]
    fn general_document_expects_nothing() {
        assert!(expected_components(DocumentType::GeneralDocument).is_empty());
    }
}
