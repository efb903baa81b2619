//! Mapping-table construction and resolution
//!
//! The table is built once per (template, document) pair by name-pattern
//! search over the template's style inventory. Resolution is a pure function
//! of the table, so repeated calls with the same inputs return the same
//! result.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis::DocumentContext;
use crate::analysis::patterns;
use crate::template::{StyleKind, WordDocumentInfo, WordStyleInfo};

use super::models::{ContextualRule, MarkdownElementType, StyleMapping};

static HEADING_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)heading\s*\d|标题|^h[1-6]$|title|chapter|章|节").unwrap());

// Generic element families resolve at priority 1-5, academic ones at 6-9.
// When both could apply to the same element the academic mapping is the more
// precise one and must win.
const PRIO_PARAGRAPH: i32 = 1;
const PRIO_LIST: i32 = 2;
const PRIO_BLOCK: i32 = 3;
const PRIO_HEADING: i32 = 5;
const PRIO_ABSTRACT_BODY: i32 = 6;
const PRIO_REFERENCE_ITEM: i32 = 7;
const PRIO_KEYWORDS: i32 = 7;
const PRIO_ACADEMIC_TITLE: i32 = 8;
const PRIO_CHAPTER_TITLE: i32 = 9;

/// Keyword lists for literal substring search against style names, lowercased.
const PARAGRAPH_KEYWORDS: &[&str] = &["normal", "正文", "body text", "body"];
const UNORDERED_LIST_KEYWORDS: &[&str] = &["list bullet", "list paragraph", "项目符号", "列表"];
const ORDERED_LIST_KEYWORDS: &[&str] = &["list number", "编号", "list paragraph"];
const QUOTE_KEYWORDS: &[&str] = &["quote", "引用", "引文"];
const CODE_KEYWORDS: &[&str] = &["code", "代码", "htmlpre", "preformatted"];
const TABLE_KEYWORDS: &[&str] = &["table text", "表格", "table"];

const ABSTRACT_TITLE_KEYWORDS: &[&str] = &["摘要标题", "abstract title", "摘要"];
const ABSTRACT_BODY_KEYWORDS: &[&str] = &["摘要正文", "abstract text", "abstract"];
const KEYWORDS_KEYWORDS: &[&str] = &["关键词", "keywords", "key words"];
const CHAPTER_TITLE_KEYWORDS: &[&str] = &["章标题", "chapter title", "chapter", "heading 1", "标题 1"];
const REFERENCES_TITLE_KEYWORDS: &[&str] = &["参考文献标题", "references title", "references"];
const REFERENCE_ITEM_KEYWORDS: &[&str] = &["参考文献", "reference", "bibliography"];
const TOC_TITLE_KEYWORDS: &[&str] = &["目录标题", "toc heading", "toc 标题", "目录"];
const TOC_ENTRY_KEYWORDS: &[&str] = &["toc 1", "toc1", "目录 1"];

/// Per-level keyword table consulted when no exact "heading N" name exists.
fn level_keywords(level: u8) -> &'static [&'static str] {
    match level {
        1 => &["title", "章", "chapter", "一级"],
        2 => &["subtitle", "节", "section", "二级"],
        3 => &["小节", "subsection", "三级"],
        _ => &["heading", "标题"],
    }
}

/// Prioritized many-to-many table from Markdown element types to template
/// style names, plus regex overrides for text whose semantics diverge from
/// its nominal heading depth.
pub struct StyleMapper<'a> {
    info: &'a WordDocumentInfo,
    mappings: BTreeMap<MarkdownElementType, Vec<StyleMapping>>,
    rules: Vec<ContextualRule>,
}

impl<'a> StyleMapper<'a> {
    pub fn new(info: &'a WordDocumentInfo) -> Self {
        let mut mapper = StyleMapper {
            info,
            mappings: BTreeMap::new(),
            rules: Vec::new(),
        };
        mapper.register_heading_mappings();
        mapper.register_generic_mappings();
        mapper.register_academic_mappings();
        mapper.register_contextual_rules();
        mapper
    }

    /// All registered mappings for one element type, priority-ordered.
    pub fn mappings_for(&self, element: MarkdownElementType) -> &[StyleMapping] {
        self.mappings.get(&element).map_or(&[], Vec::as_slice)
    }

    /// Resolve one element to a template style name.
    ///
    /// Contextual regex rules are checked against `text` first, then the
    /// priority table. A mapping whose conditions fail falls back to its
    /// declared fallback style before the resolver gives up.
    pub fn resolve(
        &self,
        element: MarkdownElementType,
        text: Option<&str>,
        context: Option<&DocumentContext>,
    ) -> Option<String> {
        if let Some(text) = text {
            for rule in &self.rules {
                if rule.pattern.is_match(text) {
                    debug!(style = %rule.style_name, "contextual rule hit");
                    return Some(rule.style_name.clone());
                }
            }
        }

        let candidates = self.mappings_for(element);
        let mut fallback: Option<&str> = None;
        for mapping in candidates {
            let passes = mapping
                .conditions
                .iter()
                .all(|c| context.is_some_and(|ctx| ctx.check(c)));
            if passes {
                return Some(mapping.style_name.clone());
            }
            if fallback.is_none() {
                fallback = mapping.fallback_style.as_deref();
            }
        }
        fallback.map(str::to_string)
    }

    /// Best template style for heading level `level`.
    ///
    /// Exact "heading N" / "标题N" / "hN" name matches win over the per-level
    /// keyword table, which wins over the first heading-like style found.
    pub fn get_best_heading_style(&self, level: u8) -> Option<&'a WordStyleInfo> {
        let paragraph_styles = || {
            self.info
                .styles
                .iter()
                .filter(|s| s.style_type == StyleKind::Paragraph)
        };

        let exact = [
            format!("heading {level}"),
            format!("heading{level}"),
            format!("标题 {level}"),
            format!("标题{level}"),
            format!("h{level}"),
        ];
        if let Some(style) = paragraph_styles().find(|s| {
            let name = s.name.to_lowercase();
            exact.iter().any(|e| name == *e)
        }) {
            return Some(style);
        }

        if let Some(style) = paragraph_styles().find(|s| {
            let name = s.name.to_lowercase();
            HEADING_LIKE.is_match(&name) && level_keywords(level).iter().any(|k| name.contains(k))
        }) {
            return Some(style);
        }

        paragraph_styles().find(|s| HEADING_LIKE.is_match(&s.name.to_lowercase()))
    }

    fn register(&mut self, mapping: StyleMapping) {
        let slot = self.mappings.entry(mapping.element).or_default();
        slot.push(mapping);
        // Priority descending, then name, so resolution order is stable.
        slot.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.style_name.cmp(&b.style_name))
        });
    }

    fn register_heading_mappings(&mut self) {
        for level in 1..=6u8 {
            if let Some(style) = self.get_best_heading_style(level) {
                self.register(StyleMapping::new(
                    MarkdownElementType::Heading(level),
                    style.name.clone(),
                    PRIO_HEADING,
                ));
            }
        }
    }

    fn register_generic_mappings(&mut self) {
        let table: &[(MarkdownElementType, &[&str], i32)] = &[
            (MarkdownElementType::Paragraph, PARAGRAPH_KEYWORDS, PRIO_PARAGRAPH),
            (MarkdownElementType::UnorderedList, UNORDERED_LIST_KEYWORDS, PRIO_LIST),
            (MarkdownElementType::OrderedList, ORDERED_LIST_KEYWORDS, PRIO_LIST),
            (MarkdownElementType::Quote, QUOTE_KEYWORDS, PRIO_BLOCK),
            (MarkdownElementType::CodeBlock, CODE_KEYWORDS, PRIO_BLOCK),
            (MarkdownElementType::Table, TABLE_KEYWORDS, PRIO_BLOCK),
        ];
        for (element, keywords, priority) in table {
            if let Some(style) = self.find_by_keywords(keywords) {
                self.register(StyleMapping::new(*element, style.name.clone(), *priority));
            }
        }
    }

    fn register_academic_mappings(&mut self) {
        let body_fallback = self
            .find_by_keywords(PARAGRAPH_KEYWORDS)
            .map(|s| s.name.clone());

        let table: &[(MarkdownElementType, &[&str], i32, &[&str])] = &[
            (
                MarkdownElementType::AbstractTitle,
                ABSTRACT_TITLE_KEYWORDS,
                PRIO_ACADEMIC_TITLE,
                &["has_chinese_abstract"],
            ),
            (
                MarkdownElementType::AbstractBody,
                ABSTRACT_BODY_KEYWORDS,
                PRIO_ABSTRACT_BODY,
                &[],
            ),
            (
                MarkdownElementType::Keywords,
                KEYWORDS_KEYWORDS,
                PRIO_KEYWORDS,
                &[],
            ),
            (
                MarkdownElementType::ChapterTitle,
                CHAPTER_TITLE_KEYWORDS,
                PRIO_CHAPTER_TITLE,
                &[],
            ),
            (
                MarkdownElementType::ReferencesTitle,
                REFERENCES_TITLE_KEYWORDS,
                PRIO_ACADEMIC_TITLE,
                &["has_references"],
            ),
            (
                MarkdownElementType::ReferenceItem,
                REFERENCE_ITEM_KEYWORDS,
                PRIO_REFERENCE_ITEM,
                &[],
            ),
            (
                MarkdownElementType::TocTitle,
                TOC_TITLE_KEYWORDS,
                PRIO_ACADEMIC_TITLE,
                &["has_toc"],
            ),
            (
                MarkdownElementType::TocEntry,
                TOC_ENTRY_KEYWORDS,
                PRIO_ABSTRACT_BODY,
                &[],
            ),
        ];
        for (element, keywords, priority, conditions) in table {
            if let Some(style) = self.find_by_keywords(keywords) {
                let mut mapping = StyleMapping::new(*element, style.name.clone(), *priority);
                mapping.conditions = conditions.iter().map(|c| c.to_string()).collect();
                mapping.fallback_style = body_fallback.clone();
                self.register(mapping);
            }
        }
    }

    /// Chapter-shaped heading text forces the chapter-title style regardless
    /// of the heading's nominal depth.
    fn register_contextual_rules(&mut self) {
        let chapter_style = self
            .find_by_keywords(CHAPTER_TITLE_KEYWORDS)
            .or_else(|| self.get_best_heading_style(1))
            .map(|s| s.name.clone());
        if let Some(style_name) = chapter_style {
            self.rules.push(ContextualRule {
                pattern: patterns::CHAPTER_CN.clone(),
                style_name,
            });
        }
        if let Some(style) = self.find_by_keywords(REFERENCES_TITLE_KEYWORDS) {
            self.rules.push(ContextualRule {
                pattern: patterns::REFERENCES.clone(),
                style_name: style.name.clone(),
            });
        }
    }

    fn find_by_keywords(&self, keywords: &[&str]) -> Option<&'a WordStyleInfo> {
        for keyword in keywords {
            let hit = self.info.styles.iter().find(|s| {
                s.style_type == StyleKind::Paragraph && s.name.to_lowercase().contains(keyword)
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::StyleKind;

    fn template_with(names: &[&str]) -> WordDocumentInfo {
        let mut info = WordDocumentInfo::new("t.docx");
        info.styles = names
            .iter()
            .map(|n| WordStyleInfo::new(n.replace(' ', ""), *n, StyleKind::Paragraph))
            .collect();
        info
    }

    #[test]
    fn exact_heading_name_beats_generic_match() {
        let info = template_with(&["Chapter Title", "Heading 2", "Normal"]);
        let mapper = StyleMapper::new(&info);
        let style = mapper.get_best_heading_style(2).expect("level 2 style");
        assert_eq!(style.name, "Heading 2");
    }

    #[test]
    fn level_keyword_table_applies_without_exact_match() {
        let info = template_with(&["章标题样式", "节标题样式", "Normal"]);
        let mapper = StyleMapper::new(&info);
        assert_eq!(mapper.get_best_heading_style(1).unwrap().name, "章标题样式");
        assert_eq!(mapper.get_best_heading_style(2).unwrap().name, "节标题样式");
    }

    #[test]
    fn higher_priority_mapping_wins() {
        let info = template_with(&["Normal"]);
        let mut mapper = StyleMapper::new(&info);
        mapper.register(StyleMapping::new(MarkdownElementType::Paragraph, "Low", 1));
        mapper.register(StyleMapping::new(MarkdownElementType::Paragraph, "High", 9));
        assert_eq!(
            mapper.resolve(MarkdownElementType::Paragraph, None, None),
            Some("High".to_string())
        );
    }

    #[test]
    fn failed_condition_falls_back() {
        let info = template_with(&["Normal"]);
        let mut mapper = StyleMapper::new(&info);
        let mut mapping =
            StyleMapping::new(MarkdownElementType::TocTitle, "TOC Heading", PRIO_ACADEMIC_TITLE);
        mapping.conditions = vec!["has_toc".to_string()];
        mapping.fallback_style = Some("Normal".to_string());
        mapper.register(mapping);

        let ctx = DocumentContext::analyze("no table of contents here");
        assert_eq!(
            mapper.resolve(MarkdownElementType::TocTitle, None, Some(&ctx)),
            Some("Normal".to_string())
        );

        let ctx = DocumentContext::analyze("# 目录\n\n1. 第一章");
        assert_eq!(
            mapper.resolve(MarkdownElementType::TocTitle, None, Some(&ctx)),
            Some("TOC Heading".to_string())
        );
    }

    #[test]
    fn chapter_pattern_overrides_nominal_level() {
        let info = template_with(&["Chapter Title", "Heading 3", "Normal"]);
        let mapper = StyleMapper::new(&info);
        // A level-3 heading whose text is chapter-shaped still gets the
        // chapter style.
        let resolved = mapper.resolve(
            MarkdownElementType::Heading(3),
            Some("第三章 系统设计"),
            None,
        );
        assert_eq!(resolved, Some("Chapter Title".to_string()));
    }

    #[test]
    fn resolution_is_deterministic() {
        let info = template_with(&["Normal", "Heading 1", "Quote"]);
        let mapper = StyleMapper::new(&info);
        let first = mapper.resolve(MarkdownElementType::Quote, None, None);
        for _ in 0..10 {
            assert_eq!(mapper.resolve(MarkdownElementType::Quote, None, None), first);
        }
    }

    #[test]
    fn empty_template_resolves_nothing_for_unmapped_types() {
        let info = template_with(&[]);
        let mapper = StyleMapper::new(&info);
        assert_eq!(mapper.resolve(MarkdownElementType::Table, None, None), None);
    }
}
