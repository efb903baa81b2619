//! Template library persistence tests: registration, lookup, search, removal.

use std::io::Write;
use std::path::Path;

use mdocx::template::TemplateLibrary;
use zip::write::SimpleFileOptions;

fn write_sample_docx(path: &Path) {
    let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#;
    let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:rFonts w:eastAsia="宋体"/><w:sz w:val="24"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="标题 1"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="AbstractTitle"><w:name w:val="摘要标题"/><w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:b/></w:rPr></w:style>
</w:styles>"#;

    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in [("word/document.xml", document), ("word/styles.xml", styles)] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[tokio::test]
async fn registered_template_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("硕士论文模板.docx");
    write_sample_docx(&source);

    let library = TemplateLibrary::open(dir.path().join("library")).unwrap();
    let record = library
        .add(&source, "硕士论文", "校级硕士学位论文格式", vec!["thesis".into()])
        .await
        .unwrap();

    // get() must return the exact analyzed inventory.
    let info = library.get(&record.id).unwrap();
    assert_eq!(info.filename, "硕士论文模板.docx");
    assert_eq!(info.styles.len(), 3);
    let abstract_title = info.style_by_name("摘要标题").expect("extracted style");
    assert!(abstract_title.bold);

    // Per-template directory layout on disk.
    let template_dir = library.root().join(&record.id);
    assert!(template_dir.join("template.docx").exists());
    assert!(template_dir.join("template_config.json").exists());
    assert!(template_dir.join("content_structure.json").exists());
    assert!(library.root().join("template_index.json").exists());
}

#[tokio::test]
async fn reopened_library_still_resolves_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("t.docx");
    write_sample_docx(&source);

    let root = dir.path().join("library");
    {
        let library = TemplateLibrary::open(&root).unwrap();
        library.add(&source, "本科模板", "", Vec::new()).await.unwrap();
    }

    // A fresh instance reads the index from disk, no cache involved.
    let library = TemplateLibrary::open(&root).unwrap();
    let info = library.get("本科模板").unwrap();
    assert!(info.style_by_name("标题 1").is_some());
}

#[tokio::test]
async fn search_and_remove_manage_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("t.docx");
    write_sample_docx(&source);

    let library = TemplateLibrary::open(dir.path().join("library")).unwrap();
    library
        .add(&source, "thesis-a", "master thesis", vec!["thesis".into()])
        .await
        .unwrap();
    let b = library
        .add(&source, "report-b", "quarterly report", vec!["report".into()])
        .await
        .unwrap();

    assert_eq!(library.search("thesis", None).unwrap().len(), 1);
    assert_eq!(library.search("", Some("report")).unwrap().len(), 1);

    library.remove(&b.id).unwrap();
    assert_eq!(library.list().unwrap().len(), 1);
    assert!(library.search("", Some("report")).unwrap().is_empty());
    assert!(!library.root().join(&b.id).exists());
}

#[tokio::test]
async fn content_structure_snapshot_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("t.docx");
    write_sample_docx(&source);

    let library = TemplateLibrary::open(dir.path().join("library")).unwrap();
    let record = library.add(&source, "快照", "", Vec::new()).await.unwrap();

    let structure = library.content_structure(&record.id).unwrap();
    assert!(!structure.paragraphs.is_empty());
    assert!(
        structure.paragraphs.iter().any(|p| p.is_heading),
        "heading-like styles must be flagged in the snapshot"
    );
}
