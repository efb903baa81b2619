//! End-to-end conversion pipeline tests: Markdown in, .docx container out.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use mdocx::convert::{ConversionOptions, Converter};
use mdocx::template::analyze_template_bytes;
use mdocx::{SectionType, analyze_document};
use zip::write::SimpleFileOptions;

const THESIS_MD: &str = "\
本文为学位论文，作者为硕士研究生，研究生学号见封面。

# 摘要

本文研究了基于模板的文档转换方法。

**关键词：** 文档转换；模板；样式映射

# Abstract

This thesis studies template-driven document conversion.

Key words: conversion; template

# 第一章 绪论

研究背景与意义。

## 1.1 研究现状

现有方法综述。

# 第二章 系统设计

整体架构如下：

- 分析层
- 映射层
- 输出层

```rust
fn main() {}
```

# 参考文献

[1] 张三. 文档转换研究[J]. 学报, 2023.
[12] 李四. 模板分析[M]. 出版社, 2022.

# 致谢

感谢各位老师。
";

fn sample_template_bytes() -> Vec<u8> {
    let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p/><w:sectPr>
    <w:pgSz w:w="11906" w:h="16838"/>
    <w:pgMar w:top="1440" w:right="1797" w:bottom="1440" w:left="1797"/>
  </w:sectPr></w:body>
</w:document>"#;
    let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:rFonts w:eastAsia="宋体"/><w:sz w:val="24"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="Heading 1"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="Heading 2"/><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="ChapterTitle"><w:name w:val="Chapter Title"/><w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/></w:rPr></w:style>
</w:styles>"#;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [("word/document.xml", document), ("word/styles.xml", styles)] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn converter(complete_missing: bool) -> Converter {
    let analysis = analyze_template_bytes(&sample_template_bytes(), "thesis.docx").unwrap();
    Converter::new(Arc::new(analysis.info), ConversionOptions { complete_missing })
}

fn document_xml(path: &std::path::Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn thesis_converts_with_canonical_ordering() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("thesis.md");
    tokio::fs::write(&input, THESIS_MD).await.unwrap();
    let output = dir.path().join("thesis.docx");

    let report = converter(false).convert_file(&input, &output).await.unwrap();
    assert!(output.exists(), "output file must exist");
    assert_eq!(
        report.document_type,
        mdocx::DocumentType::AcademicThesis,
        "thesis markers plus dual abstracts must classify as a thesis"
    );

    let xml = document_xml(&output);
    let abstract_pos = xml.find("基于模板的文档转换方法").expect("abstract body present");
    let chapter_pos = xml.find("第一章 绪论").expect("chapter heading present");
    let references_pos = xml.find("文档转换研究").expect("reference entry present");
    let acknowledgments_pos = xml.find("感谢各位老师").expect("acknowledgments present");

    assert!(abstract_pos < chapter_pos, "abstract must precede body chapters");
    assert!(chapter_pos < references_pos, "references belong to back matter");
    assert!(references_pos < acknowledgments_pos, "acknowledgments come last");
}

#[tokio::test]
async fn output_references_template_style_ids() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("styled.docx");
    converter(false).convert_text(THESIS_MD, &output).unwrap();

    let xml = document_xml(&output);
    assert!(xml.contains("ChapterTitle"), "chapter headings use the template's chapter style");
    assert!(xml.contains("Heading2"), "subsections use the level-2 heading style");
}

#[tokio::test]
async fn recognized_section_types_survive_conversion() {
    let structure = analyze_document(THESIS_MD);
    let recognized: Vec<SectionType> = structure.detected_components.iter().copied().collect();
    assert!(recognized.contains(&SectionType::AbstractCn));
    assert!(recognized.contains(&SectionType::References));

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("o.docx");
    converter(false).convert_text(THESIS_MD, &output).unwrap();
    let xml = document_xml(&output);

    // Every recognized section's title text must still be present in the
    // output, whatever the reordering did.
    for section in structure
        .sections
        .iter()
        .filter(|s| !s.section_type.is_generic())
    {
        assert!(
            xml.contains(&section.name),
            "section '{}' dropped by assembly",
            section.name
        );
    }
}

#[tokio::test]
async fn completion_mode_fills_missing_toc() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed.docx");
    let report = converter(true).convert_text(THESIS_MD, &output).unwrap();

    assert!(
        report.placeholders_inserted.contains(&SectionType::Toc),
        "thesis without a TOC must get a placeholder"
    );
    let xml = document_xml(&output);
    assert!(xml.contains("【请在此处插入目录】"));
}

#[tokio::test]
async fn reference_hanging_indent_uses_number_tiers() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("refs.docx");
    converter(false).convert_text(THESIS_MD, &output).unwrap();

    let xml = document_xml(&output);
    // [1] gets the 0.6 cm tier, [12] the 0.74 cm tier.
    assert!(xml.contains(&mdocx::template::cm_to_twips(0.6).to_string()));
    assert!(xml.contains(&mdocx::template::cm_to_twips(0.74).to_string()));
}

#[test]
fn plain_document_converts_without_template_specific_styles() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("plain.docx");
    let report = converter(false)
        .convert_text("没有任何标题的纯文本。", &output)
        .unwrap();
    assert_eq!(report.section_count, 1);
    assert!(output.exists());
}
