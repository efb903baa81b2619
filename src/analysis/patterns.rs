//! Static pattern registry for section and document-type detection
//!
//! Every regex is compiled once. The registry is a leaf: the segmenter,
//! classifier and detector all match against these patterns but never extend
//! them at runtime.

use once_cell::sync::Lazy;
use regex::Regex;

/// Chinese chapter heading with a numeral: 第一章 / 第3章.
pub(crate) static CHAPTER_CN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+章\s*\S").unwrap());

/// Numbered chapter heading with an optional 第 prefix: "第 2 章 方法" or "2 章 方法".
pub(crate) static CHAPTER_NUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第?\s*(\d+)\s*章\s+\S").unwrap());

/// Dotted numeric heading: "1.2 研究现状". Level is dot count + 1.
pub(crate) static SECTION_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.)+\d*\s*\S").unwrap());

/// ATX heading marker.
pub(crate) static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Chinese abstract title, including the full-width-spaced variant 摘　　要.
pub static ABSTRACT_CN: Lazy<Regex> = Lazy::new(|| Regex::new(r"摘\s*要|摘　+要").unwrap());

pub static ABSTRACT_EN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\babstract\b").unwrap());

/// Keywords markers are searched in the leading content, not just the title.
pub static KEYWORDS_CN: Lazy<Regex> = Lazy::new(|| Regex::new(r"关键词[:：]").unwrap());

pub static KEYWORDS_EN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)key\s*words?[:：]").unwrap());

pub static TOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)目\s*录|目　+录|table\s+of\s+contents").unwrap());

pub static REFERENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)参考文献|references|bibliography").unwrap());

pub static APPENDIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)附录|appendix").unwrap());

pub static ACKNOWLEDGMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)致谢|acknowledgm?ents?").unwrap());

/// Bracketed citation ([12], [Smith 2020]) or parenthesized year citation.
pub(crate) static CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\d+[^\]]*\]|\([^)]*\d{4}[^)]*\)").unwrap());

pub(crate) static FIGURE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)图\s*\d+|figure\s*\d+").unwrap());

pub(crate) static TABLE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)表\s*\d+|table\s*\d+").unwrap());

pub(crate) static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```|`[^`\n]+`").unwrap());

pub(crate) static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());

pub(crate) static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Leading citation number of a reference-list entry: "[12] Author. ...".
pub(crate) static REFERENCE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(\d+)\]").unwrap());

/// Academic Chinese keywords. Each hit adds weight 2 in document-type scoring.
pub(crate) const ACADEMIC_KEYWORDS_CN: &[&str] = &[
    "摘要",
    "关键词",
    "引言",
    "绪论",
    "文献综述",
    "研究方法",
    "实验方法",
    "研究结果",
    "结果分析",
    "讨论",
    "结论",
    "参考文献",
    "致谢",
    "附录",
    "学位论文",
    "硕士",
    "博士",
    "学校代码",
    "研究生学号",
    "指导教师",
    "学科专业",
    "研究方向",
    "独创性声明",
    "使用授权书",
];

/// Academic English keywords, weight 1 each (matched case-insensitively).
pub(crate) const ACADEMIC_KEYWORDS_EN: &[&str] = &[
    "abstract",
    "keywords",
    "introduction",
    "literature review",
    "methodology",
    "methods",
    "results",
    "discussion",
    "conclusion",
    "references",
    "acknowledgments",
    "appendix",
    "thesis",
    "dissertation",
    "master",
    "doctor",
    "phd",
    "university",
    "supervisor",
    "advisor",
];

/// Phrases that only appear in degree theses; any hit adds a +10 bonus.
pub(crate) const THESIS_MARKERS: &[&str] = &["学位论文", "硕士", "博士", "研究生学号"];

pub(crate) const TECHNICAL_KEYWORDS: &[&str] = &[
    "api",
    "sdk",
    "framework",
    "algorithm",
    "implementation",
    "code",
    "function",
    "class",
    "method",
    "interface",
    "system",
    "architecture",
    "design pattern",
    "database",
    "server",
    "client",
    "protocol",
];

pub(crate) const BUSINESS_KEYWORDS: &[&str] = &[
    "市场分析",
    "商业模式",
    "财务报告",
    "项目管理",
    "战略规划",
    "风险评估",
    "market analysis",
    "business model",
    "financial report",
    "project management",
    "strategic planning",
    "risk assessment",
    "roi",
    "kpi",
    "revenue",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_patterns_match_common_headings() {
        assert!(CHAPTER_CN.is_match("第一章 绪论"));
        assert!(CHAPTER_CN.is_match("第3章 系统设计"));
        assert!(!CHAPTER_CN.is_match("第一章"));
        assert!(CHAPTER_NUM.is_match("第 2 章 相关工作"));
        assert!(SECTION_NUM.is_match("1.2 研究现状"));
        assert!(SECTION_NUM.is_match("2.1.3 数据来源"));
        assert!(!SECTION_NUM.is_match("引言"));
    }

    #[test]
    fn abstract_pattern_accepts_fullwidth_spacing() {
        assert!(ABSTRACT_CN.is_match("摘要"));
        assert!(ABSTRACT_CN.is_match("摘 要"));
        assert!(ABSTRACT_CN.is_match("摘　　要"));
        assert!(ABSTRACT_EN.is_match("Abstract"));
        assert!(ABSTRACT_EN.is_match("ABSTRACT"));
        // "abstraction" must not count as an abstract title
        assert!(!ABSTRACT_EN.is_match("abstraction layers"));
    }

    #[test]
    fn keyword_markers_accept_both_colons() {
        assert!(KEYWORDS_CN.is_match("关键词：深度学习；自然语言处理"));
        assert!(KEYWORDS_CN.is_match("关键词: 检索"));
        assert!(KEYWORDS_EN.is_match("Key words: retrieval"));
        assert!(KEYWORDS_EN.is_match("Keywords：retrieval"));
    }

    #[test]
    fn reference_number_extracts_leading_index() {
        let caps = REFERENCE_NUMBER.captures("[12] Author. Title[J].").unwrap();
        assert_eq!(&caps[1], "12");
        assert!(REFERENCE_NUMBER.captures("Author [12]").is_none());
    }
}
