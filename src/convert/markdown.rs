//! Markdown block and inline parsing for the writer
//!
//! Deliberately small: the converter targets loosely-structured academic
//! Markdown (ATX headings, pipe tables, fenced code, blockquotes, simple
//! emphasis), not the full CommonMark surface.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::segmenter;

static INLINE_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\*[^*]+\*\*\*|\*\*[^*]+\*\*|\*[^*]+\*|`[^`\n]+`").unwrap()
});
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());
static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.+)$").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)[.)]\s+(.+)$").unwrap());
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```\s*(\S*)\s*$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|?[\s:|-]+\|?\s*$").unwrap());

/// One formatted span of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl InlineRun {
    fn plain(text: impl Into<String>) -> Self {
        InlineRun {
            text: text.into(),
            bold: false,
            italic: false,
            code: false,
        }
    }
}

/// One block-level element of the section body.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<InlineRun>),
    UnorderedItem(Vec<InlineRun>),
    OrderedItem { number: u32, runs: Vec<InlineRun> },
    Quote(Vec<InlineRun>),
    CodeBlock { language: Option<String>, lines: Vec<String> },
    Table { rows: Vec<Vec<String>> },
}

/// Split one line of Markdown into styled runs.
///
/// Links and images collapse to their label text before emphasis parsing.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let text = LINK.replace_all(text, "$1");
    let mut runs = Vec::new();
    let mut cursor = 0;

    for m in INLINE_SPAN.find_iter(&text) {
        if m.start() > cursor {
            runs.push(InlineRun::plain(&text[cursor..m.start()]));
        }
        let span = m.as_str();
        let run = if let Some(inner) = span.strip_prefix("***").and_then(|s| s.strip_suffix("***"))
        {
            InlineRun {
                text: inner.to_string(),
                bold: true,
                italic: true,
                code: false,
            }
        } else if let Some(inner) = span.strip_prefix("**").and_then(|s| s.strip_suffix("**")) {
            InlineRun {
                text: inner.to_string(),
                bold: true,
                italic: false,
                code: false,
            }
        } else if let Some(inner) = span.strip_prefix('*').and_then(|s| s.strip_suffix('*')) {
            InlineRun {
                text: inner.to_string(),
                bold: false,
                italic: true,
                code: false,
            }
        } else {
            InlineRun {
                text: span.trim_matches('`').to_string(),
                bold: false,
                italic: false,
                code: true,
            }
        };
        runs.push(run);
        cursor = m.end();
    }
    if cursor < text.len() {
        runs.push(InlineRun::plain(&text[cursor..]));
    }

    consolidate(runs)
}

/// Merge adjacent runs with identical formatting.
fn consolidate(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut out: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(prev)
                if prev.bold == run.bold && prev.italic == run.italic && prev.code == run.code =>
            {
                prev.text.push_str(&run.text);
            }
            _ => out.push(run),
        }
    }
    out
}

/// Parse a section body into block elements.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut code: Option<(Option<String>, Vec<String>)> = None;
    let mut table: Vec<Vec<String>> = Vec::new();

    let flush_paragraph = |paragraph: &mut Vec<String>, blocks: &mut Vec<Block>| {
        if !paragraph.is_empty() {
            let joined = paragraph.join(" ");
            blocks.push(Block::Paragraph(parse_inline(&joined)));
            paragraph.clear();
        }
    };
    let flush_table = |table: &mut Vec<Vec<String>>, blocks: &mut Vec<Block>| {
        if !table.is_empty() {
            blocks.push(Block::Table {
                rows: std::mem::take(table),
            });
        }
    };

    for line in text.lines() {
        if let Some((language, lines)) = code.as_mut() {
            if FENCE.is_match(line.trim()) {
                blocks.push(Block::CodeBlock {
                    language: language.take(),
                    lines: std::mem::take(lines),
                });
                code = None;
            } else {
                lines.push(line.to_string());
            }
            continue;
        }

        let trimmed = line.trim();
        if let Some(caps) = FENCE.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_table(&mut table, &mut blocks);
            let language = (!caps[1].is_empty()).then(|| caps[1].to_string());
            code = Some((language, Vec::new()));
            continue;
        }

        if trimmed.starts_with('|') && trimmed.ends_with('|') {
            flush_paragraph(&mut paragraph, &mut blocks);
            if !TABLE_SEPARATOR.is_match(trimmed) {
                let cells = trimmed
                    .trim_matches('|')
                    .split('|')
                    .map(|c| c.trim().to_string())
                    .collect();
                table.push(cells);
            }
            continue;
        }
        flush_table(&mut table, &mut blocks);

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }

        // List items take precedence over heading detection: "2. 第二项" is an
        // ordered item, while "1.2 现状" (no space after the dot) is a dotted
        // numeric heading.
        if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::OrderedItem {
                number: caps[1].parse().unwrap_or(0),
                runs: parse_inline(&caps[2]),
            });
            continue;
        }
        if let Some(caps) = UNORDERED_ITEM.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::UnorderedItem(parse_inline(&caps[1])));
            continue;
        }

        if let Some(heading) = segmenter::detect_heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level: heading.level,
                text: heading.title,
            });
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('>') {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Quote(parse_inline(rest.trim_start())));
            continue;
        }

        paragraph.push(trimmed.to_string());
    }

    if let Some((language, lines)) = code {
        // Unterminated fence: keep what was collected.
        blocks.push(Block::CodeBlock { language, lines });
    }
    flush_paragraph(&mut paragraph, &mut blocks);
    flush_table(&mut table, &mut blocks);

    blocks
}
