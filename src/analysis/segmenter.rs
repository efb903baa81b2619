//! Document segmentation
//!
//! Splits raw text into a linear sequence of titled sections by scanning for
//! heading markers: ATX `#` prefixes, Chinese chapter numerals, and dotted
//! numeric headers. Sections tile the input: half-open line ranges with no
//! gaps and no overlaps, so concatenating all ranges reconstructs the input
//! exactly once.

use super::models::{ContentSection, SectionType};
use super::patterns;

/// Synthetic name given to untitled leading content.
pub const PREFACE_NAME: &str = "前言";

/// Detected heading: title text and level 1..=6.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Heading {
    pub title: String,
    pub level: u8,
}

/// Classify a single line as a heading, if it is one.
pub(crate) fn detect_heading(line: &str) -> Option<Heading> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = patterns::ATX_HEADING.captures(line) {
        let level = caps[1].len() as u8;
        return Some(Heading {
            title: caps[2].trim().to_string(),
            level,
        });
    }

    // Bare chapter headers outside Markdown syntax: 第一章 / 第3章 / 2 章.
    if patterns::CHAPTER_CN.is_match(line) || patterns::CHAPTER_NUM.is_match(line) {
        return Some(Heading {
            title: line.to_string(),
            level: 1,
        });
    }

    // Dotted numeric headers: "1.2 现状" is level 2 (dot count + 1, capped at 6).
    if patterns::SECTION_NUM.is_match(line) {
        let level = (line.chars().filter(|&c| c == '.').count() as u8 + 1).min(6);
        return Some(Heading {
            title: line.to_string(),
            level,
        });
    }

    None
}

/// Split normalized text into contiguous sections.
///
/// Leading content before the first heading becomes a synthetic level-0
/// preface. A document with no headings yields exactly one preface section
/// spanning the whole input; an all-blank document yields none.
pub fn segment(text: &str) -> Vec<ContentSection> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections: Vec<ContentSection> = Vec::new();

    // (name, level, start) of the currently open section.
    let mut open: Option<(String, u8, usize)> = None;

    for (i, raw_line) in lines.iter().enumerate() {
        if let Some(heading) = detect_heading(raw_line) {
            if let Some((name, level, start)) = open.take() {
                push_section(&mut sections, &lines, name, level, start, i);
            }
            open = Some((heading.title, heading.level, i));
        } else if open.is_none() && !raw_line.trim().is_empty() {
            open = Some((PREFACE_NAME.to_string(), 0, i));
        }
    }

    if let Some((name, level, start)) = open {
        push_section(&mut sections, &lines, name, level, start, lines.len());
    }

    sections
}

fn push_section(
    sections: &mut Vec<ContentSection>,
    lines: &[&str],
    name: String,
    level: u8,
    start: usize,
    end: usize,
) {
    let content = lines[start..end].join("\n");
    if content.trim().is_empty() {
        return;
    }
    // Blank lines between the previous section and this heading are pulled
    // back into the previous section; blank lines before the very first
    // section fold into its range. Either way the ranges stay gap-free.
    let start_line = match sections.last_mut() {
        Some(prev) => {
            if prev.end_line < start {
                prev.end_line = start;
            }
            start
        }
        None => 0,
    };
    sections.push(ContentSection {
        name,
        content,
        section_type: SectionType::Unknown,
        level,
        start_line,
        end_line: end,
        confidence: 0.0,
    });
}
