//! Document context for conditional style mapping
//!
//! A set of booleans computed once per conversion and consulted by mapping
//! conditions and contextual rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::patterns;

static HEADING_ABSTRACT_CN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#+\s*(摘\s*要|摘　+要)").unwrap());
static HEADING_ABSTRACT_EN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)#+\s*abstract").unwrap());
static HEADING_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#+\s*第[一二三四五六七八九十\d]+章").unwrap());
static HEADING_NUMBERED_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s*\d+\.\d+").unwrap());
static HEADING_REFERENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)#+\s*(参考文献|references|bibliography)").unwrap());
static HEADING_TOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)#+\s*(目录|目　+录|table\s*of\s*contents)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Chinese,
    English,
    Mixed,
}

/// Boolean predicates over the full document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentContext {
    pub has_chinese_abstract: bool,
    pub has_english_abstract: bool,
    pub has_chinese_keywords: bool,
    pub has_english_keywords: bool,
    pub has_chapters: bool,
    pub has_numbered_sections: bool,
    pub has_references: bool,
    pub has_toc: bool,
    pub language: Language,
}

impl DocumentContext {
    pub fn analyze(content: &str) -> Self {
        DocumentContext {
            has_chinese_abstract: HEADING_ABSTRACT_CN.is_match(content),
            has_english_abstract: HEADING_ABSTRACT_EN.is_match(content),
            has_chinese_keywords: patterns::KEYWORDS_CN.is_match(content),
            has_english_keywords: patterns::KEYWORDS_EN.is_match(content),
            has_chapters: HEADING_CHAPTER.is_match(content),
            has_numbered_sections: HEADING_NUMBERED_SECTION.is_match(content),
            has_references: HEADING_REFERENCES.is_match(content),
            has_toc: HEADING_TOC.is_match(content),
            language: detect_language(content),
        }
    }

    /// Look up a named condition used by `StyleMapping::conditions`.
    pub fn check(&self, condition: &str) -> bool {
        match condition {
            "has_chinese_abstract" => self.has_chinese_abstract,
            "has_english_abstract" => self.has_english_abstract,
            "has_chinese_keywords" => self.has_chinese_keywords,
            "has_english_keywords" => self.has_english_keywords,
            "has_chapters" => self.has_chapters,
            "has_references" => self.has_references,
            "has_toc" => self.has_toc,
            _ => false,
        }
    }
}

fn detect_language(content: &str) -> Language {
    let chinese = content
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count();
    let english = content.chars().filter(|c| c.is_ascii_alphabetic()).count();

    if chinese > english {
        Language::Chinese
    } else if english > chinese {
        Language::English
    } else {
        Language::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_dual_abstract_headings() {
        let ctx = DocumentContext::analyze("# 摘要\n\n内容\n\n# Abstract\n\ncontent");
        assert!(ctx.has_chinese_abstract);
        assert!(ctx.has_english_abstract);
        assert!(!ctx.has_references);
    }

    #[test]
    fn keyword_presence_feeds_conditions() {
        let ctx = DocumentContext::analyze("关键词：检索\n\nKey words: retrieval");
        assert!(ctx.check("has_chinese_keywords"));
        assert!(ctx.check("has_english_keywords"));
        assert!(!ctx.check("no_such_condition"));
    }

    #[test]
    fn language_detection_prefers_majority_script() {
        assert_eq!(DocumentContext::analyze("这是一段中文内容，只有中文。").language, Language::Chinese);
        assert_eq!(
            DocumentContext::analyze("This is English only content.").language,
            Language::English
        );
    }
}
