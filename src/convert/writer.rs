//! Document emission through docx-rs
//!
//! The template's analyzed styles are re-registered in the output container
//! under their original style ids, so the produced document carries the
//! template's formatting vocabulary. Content paragraphs reference those ids
//! through the mapper's resolution; an unresolved element is still emitted,
//! unstyled, rather than dropped.

use std::io::Cursor;
use std::path::Path;

use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Run, RunFonts,
    SpecialIndentType, Start, Style, StyleType, Table, TableCell, TableRow,
};
use tracing::debug;

use crate::analysis::{DocumentContext, SectionType, patterns};
use crate::error::{ConvertError, ConvertResult};
use crate::mapping::{MarkdownElementType, StyleMapper};
use crate::template::{Alignment, StyleKind, WordDocumentInfo, cm_to_twips};

use super::assembler::AssembledSection;
use super::markdown::{self, Block, InlineRun};

const ORDERED_NUMBERING_ID: usize = 1;
const UNORDERED_NUMBERING_ID: usize = 2;

const CODE_FONT: &str = "Courier New";

/// Hanging indent for a numbered reference entry, by citation number range.
/// Wider numbers need a deeper hang so the text edge stays aligned.
fn reference_hanging_cm(number: u32) -> f64 {
    match number {
        0..=9 => 0.6,
        10..=99 => 0.74,
        _ => 0.9,
    }
}

/// Left indent for a table-of-contents entry by its level.
fn toc_indent_cm(level: u8) -> f64 {
    match level {
        0 | 1 => 0.0,
        2 => 0.37,
        _ => 0.74,
    }
}

pub struct DocxWriter<'a> {
    info: &'a WordDocumentInfo,
    mapper: &'a StyleMapper<'a>,
    context: &'a DocumentContext,
}

impl<'a> DocxWriter<'a> {
    pub fn new(
        info: &'a WordDocumentInfo,
        mapper: &'a StyleMapper<'a>,
        context: &'a DocumentContext,
    ) -> Self {
        DocxWriter {
            info,
            mapper,
            context,
        }
    }

    /// Serialize the assembled sections to `output`.
    pub fn write(&self, assembled: &[AssembledSection], output: &Path) -> ConvertResult<()> {
        let buffer = self.build_bytes(assembled)?;
        std::fs::write(output, buffer).map_err(|source| ConvertError::OutputWrite {
            path: output.to_path_buf(),
            source,
        })?;
        debug!(path = %output.display(), "document written");
        Ok(())
    }

    /// Build the container in memory.
    pub fn build_bytes(&self, assembled: &[AssembledSection]) -> ConvertResult<Vec<u8>> {
        let mut docx = self.base_document();

        for section in assembled {
            if section.page_break_before {
                docx = docx
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
            }
            docx = self.emit_section(docx, section);
        }

        let mut buffer = Vec::new();
        docx.build()
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| ConvertError::Serialize(e.to_string()))?;
        Ok(buffer)
    }

    /// Page geometry, template styles and list numbering definitions.
    fn base_document(&self) -> Docx {
        let setup = &self.info.page_setup;
        let mut docx = Docx::new()
            .page_size(
                cm_to_twips(setup.width) as u32,
                cm_to_twips(setup.height) as u32,
            )
            .page_margin(
                PageMargin::new()
                    .top(cm_to_twips(setup.margin_top))
                    .bottom(cm_to_twips(setup.margin_bottom))
                    .left(cm_to_twips(setup.margin_left))
                    .right(cm_to_twips(setup.margin_right)),
            );

        for style in &self.info.styles {
            if matches!(style.style_type, StyleKind::Table | StyleKind::List) {
                continue;
            }
            docx = docx.add_style(register_style(style));
        }

        ordered_and_unordered_numbering(docx)
    }

    fn emit_section(&self, mut docx: Docx, section: &AssembledSection) -> Docx {
        if let Some(title) = &section.title {
            let element = title_element(section.section_type, section.level);
            let paragraph = self.styled_paragraph(element, Some(title));
            docx = docx.add_paragraph(paragraph.add_run(Run::new().add_text(title)));
        }

        match section.section_type {
            SectionType::References => self.emit_reference_list(docx, &section.body),
            SectionType::Toc => self.emit_toc_entries(docx, &section.body),
            _ => self.emit_blocks(docx, section),
        }
    }

    fn emit_blocks(&self, mut docx: Docx, section: &AssembledSection) -> Docx {
        let body_element = body_element(section.section_type);

        for block in markdown::parse_blocks(&section.body) {
            docx = match block {
                Block::Heading { level, text } => {
                    let paragraph = self
                        .styled_paragraph(MarkdownElementType::Heading(level), Some(&text))
                        .add_run(Run::new().add_text(&text));
                    docx.add_paragraph(paragraph)
                }
                Block::Paragraph(runs) => {
                    let mut paragraph = self.styled_paragraph(body_element, None);
                    for run in runs {
                        paragraph = paragraph.add_run(inline_run(&run));
                    }
                    docx.add_paragraph(paragraph)
                }
                Block::UnorderedItem(runs) => docx.add_paragraph(self.list_item(
                    MarkdownElementType::UnorderedList,
                    UNORDERED_NUMBERING_ID,
                    &runs,
                )),
                Block::OrderedItem { runs, .. } => docx.add_paragraph(self.list_item(
                    MarkdownElementType::OrderedList,
                    ORDERED_NUMBERING_ID,
                    &runs,
                )),
                Block::Quote(runs) => {
                    let mut paragraph = self.styled_paragraph(MarkdownElementType::Quote, None);
                    if self
                        .mapper
                        .resolve(MarkdownElementType::Quote, None, Some(self.context))
                        .is_none()
                    {
                        paragraph = paragraph.indent(Some(720), None, None, None);
                    }
                    for run in runs {
                        paragraph = paragraph.add_run(inline_run(&run).italic());
                    }
                    docx.add_paragraph(paragraph)
                }
                Block::CodeBlock { lines, .. } => {
                    let paragraph = self.styled_paragraph(MarkdownElementType::CodeBlock, None);
                    let mut run = Run::new().fonts(code_fonts());
                    for (i, line) in lines.iter().enumerate() {
                        if i > 0 {
                            run = run.add_break(BreakType::TextWrapping);
                        }
                        run = run.add_text(line);
                    }
                    docx.add_paragraph(paragraph.add_run(run))
                }
                Block::Table { rows } => docx.add_table(self.build_table(&rows)),
            };
        }
        docx
    }

    /// References are line-oriented: every non-empty line is one entry with a
    /// hanging indent sized by its leading citation number.
    fn emit_reference_list(&self, mut docx: Docx, body: &str) -> Docx {
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let number = patterns::REFERENCE_NUMBER
                .captures(line)
                .and_then(|caps| caps[1].parse::<u32>().ok())
                .unwrap_or(1);
            let hang = cm_to_twips(reference_hanging_cm(number));

            let mut paragraph = self
                .styled_paragraph(MarkdownElementType::ReferenceItem, None)
                .indent(Some(hang), Some(SpecialIndentType::Hanging(hang)), None, None);
            for run in markdown::parse_inline(line) {
                paragraph = paragraph.add_run(inline_run(&run));
            }
            docx = docx.add_paragraph(paragraph);
        }
        docx
    }

    fn emit_toc_entries(&self, mut docx: Docx, body: &str) -> Docx {
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let level = crate::analysis::segmenter::detect_heading(line)
                .map(|h| h.level)
                .unwrap_or(1);
            let mut paragraph = self.styled_paragraph(MarkdownElementType::TocEntry, None);
            let indent = cm_to_twips(toc_indent_cm(level));
            if indent > 0 {
                paragraph = paragraph.indent(Some(indent), None, None, None);
            }
            docx = docx.add_paragraph(paragraph.add_run(Run::new().add_text(line)));
        }
        docx
    }

    fn list_item(
        &self,
        element: MarkdownElementType,
        numbering_id: usize,
        runs: &[InlineRun],
    ) -> Paragraph {
        let mut paragraph = self
            .styled_paragraph(element, None)
            .numbering(NumberingId::new(numbering_id), IndentLevel::new(0));
        for run in runs {
            paragraph = paragraph.add_run(inline_run(run));
        }
        paragraph
    }

    /// Paragraph carrying the resolved style id for `element`, if any.
    fn styled_paragraph(&self, element: MarkdownElementType, text: Option<&str>) -> Paragraph {
        let paragraph = Paragraph::new();
        match self.resolve_style_id(element, text) {
            Some(style_id) => paragraph.style(&style_id),
            None => paragraph,
        }
    }

    /// Map an element to a style id: mapper resolution gives a style name,
    /// the inventory translates it back to the id registered in the output.
    fn resolve_style_id(&self, element: MarkdownElementType, text: Option<&str>) -> Option<String> {
        let mut name = self.mapper.resolve(element, text, Some(self.context));
        if name.is_none() {
            if let MarkdownElementType::Heading(level) = element {
                name = self.mapper.get_best_heading_style(level).map(|s| s.name.clone());
            } else if element.is_academic() {
                // Academic element without a dedicated template style: fall
                // through to the structural equivalent.
                let structural = match element {
                    MarkdownElementType::ChapterTitle
                    | MarkdownElementType::AbstractTitle
                    | MarkdownElementType::ReferencesTitle
                    | MarkdownElementType::TocTitle => MarkdownElementType::Heading(1),
                    _ => MarkdownElementType::Paragraph,
                };
                name = self.mapper.resolve(structural, None, Some(self.context));
            }
        }
        let name = name?;
        Some(
            self.info
                .style_by_name(&name)
                .map(|s| s.style_id.clone())
                .unwrap_or(name),
        )
    }

    fn build_table(&self, rows: &[Vec<String>]) -> Table {
        let table_rows = rows
            .iter()
            .map(|cells| {
                TableRow::new(
                    cells
                        .iter()
                        .map(|cell| {
                            let mut paragraph =
                                self.styled_paragraph(MarkdownElementType::Table, None);
                            for run in markdown::parse_inline(cell) {
                                paragraph = paragraph.add_run(inline_run(&run));
                            }
                            TableCell::new().add_paragraph(paragraph)
                        })
                        .collect(),
                )
            })
            .collect();
        Table::new(table_rows)
    }
}

/// Rebuild one analyzed style as an output style definition.
fn register_style(style: &crate::template::WordStyleInfo) -> Style {
    let style_type = match style.style_type {
        StyleKind::Character => StyleType::Character,
        _ => StyleType::Paragraph,
    };
    let mut out = Style::new(&style.style_id, style_type).name(&style.name);

    if style.bold {
        out = out.bold();
    }
    if style.italic {
        out = out.italic();
    }
    if let Some(size) = style.font_size {
        // docx-rs takes half-points.
        out = out.size((size * 2.0).round() as usize);
    }
    if let Some(color) = &style.font_color {
        out = out.color(color.clone());
    }
    if style.font_name.is_some() || style.font_name_east_asia.is_some() {
        let mut fonts = RunFonts::new();
        if let Some(ascii) = &style.font_name {
            fonts = fonts.ascii(ascii).hi_ansi(ascii);
        }
        if let Some(east_asia) = &style.font_name_east_asia {
            fonts = fonts.east_asia(east_asia);
        }
        out = out.fonts(fonts);
    }
    if let Some(alignment) = style.alignment {
        out = out.align(match alignment {
            Alignment::Left => AlignmentType::Left,
            Alignment::Center => AlignmentType::Center,
            Alignment::Right => AlignmentType::Right,
            Alignment::Justify => AlignmentType::Both,
            Alignment::Distribute => AlignmentType::Distribute,
        });
    }
    out
}

fn ordered_and_unordered_numbering(docx: Docx) -> Docx {
    let mut ordered = AbstractNumbering::new(ORDERED_NUMBERING_ID);
    let mut unordered = AbstractNumbering::new(UNORDERED_NUMBERING_ID);
    for i in 0..3usize {
        let indent = 720 * (i + 1) as i32;
        ordered = ordered.add_level(
            Level::new(
                i,
                Start::new(1),
                NumberFormat::new("decimal"),
                LevelText::new(format!("%{}.", i + 1)),
                LevelJc::new("left"),
            )
            .indent(Some(indent), Some(SpecialIndentType::Hanging(420)), None, None),
        );
        unordered = unordered.add_level(
            Level::new(
                i,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            )
            .indent(Some(indent), Some(SpecialIndentType::Hanging(360)), None, None),
        );
    }
    docx.add_abstract_numbering(ordered)
        .add_abstract_numbering(unordered)
        .add_numbering(Numbering::new(ORDERED_NUMBERING_ID, ORDERED_NUMBERING_ID))
        .add_numbering(Numbering::new(UNORDERED_NUMBERING_ID, UNORDERED_NUMBERING_ID))
}

fn inline_run(run: &InlineRun) -> Run {
    let mut out = Run::new().add_text(&run.text);
    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if run.code {
        out = out.fonts(code_fonts());
    }
    out
}

fn code_fonts() -> RunFonts {
    RunFonts::new()
        .ascii(CODE_FONT)
        .hi_ansi(CODE_FONT)
        .east_asia(CODE_FONT)
        .cs(CODE_FONT)
}

/// Section-title element for the mapper.
fn title_element(section_type: SectionType, level: u8) -> MarkdownElementType {
    match section_type {
        SectionType::AbstractCn | SectionType::AbstractEn => MarkdownElementType::AbstractTitle,
        SectionType::KeywordsCn | SectionType::KeywordsEn => MarkdownElementType::Keywords,
        SectionType::Toc => MarkdownElementType::TocTitle,
        SectionType::References => MarkdownElementType::ReferencesTitle,
        SectionType::Chapter
        | SectionType::Introduction
        | SectionType::LiteratureReview
        | SectionType::Methodology
        | SectionType::Results
        | SectionType::Discussion
        | SectionType::Conclusion
            if level <= 1 =>
        {
            MarkdownElementType::ChapterTitle
        }
        _ => MarkdownElementType::Heading(level.clamp(1, 6)),
    }
}

/// Body element for plain paragraphs of a section.
fn body_element(section_type: SectionType) -> MarkdownElementType {
    match section_type {
        SectionType::AbstractCn | SectionType::AbstractEn => MarkdownElementType::AbstractBody,
        SectionType::KeywordsCn | SectionType::KeywordsEn => MarkdownElementType::Keywords,
        _ => MarkdownElementType::Paragraph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_document;
    use crate::convert::assembler;
    use crate::template::WordStyleInfo;
    use std::io::Read;

    fn template() -> WordDocumentInfo {
        let mut info = WordDocumentInfo::new("t.docx");
        let names = [
            ("Normal", "Normal"),
            ("Heading1", "Heading 1"),
            ("Heading2", "Heading 2"),
            ("ChapterTitle", "Chapter Title"),
            ("References", "参考文献"),
        ];
        info.styles = names
            .iter()
            .map(|(id, name)| WordStyleInfo::new(*id, *name, StyleKind::Paragraph))
            .collect();
        info
    }

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name("word/document.xml").unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn hanging_indent_tier_follows_citation_number() {
        assert!((reference_hanging_cm(3) - 0.6).abs() < f64::EPSILON);
        assert!((reference_hanging_cm(12) - 0.74).abs() < f64::EPSILON);
        assert!((reference_hanging_cm(120) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn toc_indent_deepens_with_level() {
        assert_eq!(toc_indent_cm(1), 0.0);
        assert!((toc_indent_cm(2) - 0.37).abs() < f64::EPSILON);
        assert!((toc_indent_cm(5) - 0.74).abs() < f64::EPSILON);
    }

    #[test]
    fn written_container_references_template_styles() {
        let info = template();
        let mapper = StyleMapper::new(&info);
        let context = DocumentContext::analyze("");
        let writer = DocxWriter::new(&info, &mapper, &context);

        let input = "# 第一章 绪论\n\n正文内容，包含**重点**词。\n\n## 1.1 背景\n\n更多内容。";
        let structure = analyze_document(input);
        let assembled = assembler::assemble(&structure, false);
        let bytes = writer.build_bytes(&assembled).unwrap();

        let xml = document_xml(&bytes);
        assert!(xml.contains("ChapterTitle"), "chapter style id missing");
        assert!(xml.contains("正文内容"));
        assert!(xml.contains("重点"));
    }

    #[test]
    fn reference_entries_get_hanging_indents() {
        let info = template();
        let mapper = StyleMapper::new(&info);
        let context = DocumentContext::analyze("# 参考文献");
        let writer = DocxWriter::new(&info, &mapper, &context);

        let input = "# 参考文献\n\n[1] 作者甲. 标题[J].\n[12] 作者乙. 标题[M].";
        let structure = analyze_document(input);
        let assembled = assembler::assemble(&structure, false);
        let bytes = writer.build_bytes(&assembled).unwrap();

        let xml = document_xml(&bytes);
        // 0.74 cm and 0.6 cm in twips
        assert!(xml.contains(&cm_to_twips(0.74).to_string()));
        assert!(xml.contains(&cm_to_twips(0.6).to_string()));
    }

    #[test]
    fn output_is_a_zip_container() {
        let info = template();
        let mapper = StyleMapper::new(&info);
        let context = DocumentContext::analyze("");
        let writer = DocxWriter::new(&info, &mapper, &context);
        let structure = analyze_document("简单段落。");
        let bytes = writer
            .build_bytes(&assembler::assemble(&structure, false))
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
