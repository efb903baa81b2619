//! Two-pass template analysis
//!
//! Pass one reads the OOXML parts straight out of the ZIP container and is
//! authoritative for style attributes, numbering, theme data and page
//! geometry. Pass two runs the document-object model over the same bytes and
//! contributes presence flags the raw pass may have missed. Results are merged
//! by style id. Missing parts degrade to warnings so a sparse template still
//! analyzes.

use std::io::{Cursor, Read};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{ConvertError, ConvertResult, ExtractionWarning};

use super::models::{StyleKind, WordDocumentInfo, WordStyleInfo};
use super::xml;

/// Outcome of analyzing one template file.
#[derive(Debug, Clone)]
pub struct TemplateAnalysis {
    pub info: WordDocumentInfo,
    /// Recoverable extraction problems, in the order they were noticed.
    pub warnings: Vec<ExtractionWarning>,
}

/// Analyze a .docx template on disk.
pub async fn analyze_template(path: &Path) -> ConvertResult<TemplateAnalysis> {
    if !path.exists() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }
    let is_docx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
    if !is_docx {
        return Err(ConvertError::InvalidTemplate {
            path: path.to_path_buf(),
            reason: "expected a .docx file".to_string(),
        });
    }

    let data = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("template.docx")
        .to_string();

    let analysis = analyze_template_bytes(&data, &filename).map_err(|reason| {
        ConvertError::InvalidTemplate {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    info!(
        template = %filename,
        styles = analysis.info.styles.len(),
        warnings = analysis.warnings.len(),
        "template analyzed"
    );
    Ok(analysis)
}

/// Analyze an in-memory .docx container. Returns a plain reason string on
/// container-level failure so callers can attach the file path.
pub fn analyze_template_bytes(data: &[u8], filename: &str) -> Result<TemplateAnalysis, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| format!("not a ZIP container: {e}"))?;

    if archive.by_name("word/document.xml").is_err() {
        return Err("missing word/document.xml".to_string());
    }

    let mut info = WordDocumentInfo::new(filename);
    let mut warnings = Vec::new();

    match read_part(&mut archive, "word/styles.xml") {
        Some(styles_xml) => {
            info.styles = xml::parse_styles_xml(&styles_xml, &mut warnings);
        }
        None => warnings.push(ExtractionWarning::new(
            "styles.xml",
            "part missing, style inventory will be empty",
        )),
    }

    if let Some(numbering_xml) = read_part(&mut archive, "word/numbering.xml") {
        info.numbering_definitions = xml::parse_numbering_xml(&numbering_xml, &mut warnings);
    }

    if let Some(theme_xml) = read_part(&mut archive, "word/theme/theme1.xml") {
        let (colors, fonts) = xml::parse_theme_xml(&theme_xml, &mut warnings);
        info.theme_colors = colors;
        info.font_scheme = fonts;
    }

    if let Some(settings_xml) = read_part(&mut archive, "word/settings.xml") {
        info.different_odd_even_headers = xml::parse_settings_xml(&settings_xml);
    }

    if let Some(document_xml) = read_part(&mut archive, "word/document.xml") {
        match xml::parse_page_setup(&document_xml) {
            Some(setup) => info.page_setup = setup,
            None => warnings.push(ExtractionWarning::new(
                "document.xml",
                "no sectPr page geometry, using A4 defaults",
            )),
        }
    }

    merge_object_pass(data, &mut info, &mut warnings);

    if info.styles.is_empty() {
        warnings.push(ExtractionWarning::new(
            "styles",
            "template defines no styles, substituting built-in fallbacks",
        ));
        info.styles = WordDocumentInfo::fallback_styles();
    }

    debug!(
        styles = info.styles.len(),
        numbering = info.numbering_definitions.len(),
        "raw container pass complete"
    );
    Ok(TemplateAnalysis { info, warnings })
}

fn read_part<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let mut part = archive.by_name(name).ok()?;
    let mut content = String::new();
    part.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Fold the document-object pass into the raw inventory.
///
/// The object model leaves several style attributes unexposed, so this pass
/// only confirms style identity and run-property presence flags. Failure here
/// is a warning: the raw pass already produced a usable inventory.
fn merge_object_pass(data: &[u8], info: &mut WordDocumentInfo, warnings: &mut Vec<ExtractionWarning>) {
    let docx = match docx_rs::read_docx(data) {
        Ok(docx) => docx,
        Err(err) => {
            warn!(error = %err, "object-model pass failed, keeping raw pass only");
            warnings.push(ExtractionWarning::new(
                "object model",
                format!("document parse failed: {err}"),
            ));
            return;
        }
    };

    for style in &docx.styles.styles {
        let style_id = style.style_id.clone();
        let kind = match style.style_type {
            docx_rs::StyleType::Character => StyleKind::Character,
            docx_rs::StyleType::Table => StyleKind::Table,
            docx_rs::StyleType::Numbering => StyleKind::List,
            _ => StyleKind::Paragraph,
        };
        let bold = style.run_property.bold.is_some();
        let italic = style.run_property.italic.is_some();

        match info.styles.iter_mut().find(|s| s.style_id == style_id) {
            Some(existing) => {
                existing.bold |= bold;
                existing.italic |= italic;
            }
            None => {
                // Style visible to the object model but absent from the raw
                // inventory. Record a stub so mapping can still target it.
                let mut stub = WordStyleInfo::new(style_id.clone(), style_id, kind);
                stub.bold = bold;
                stub.italic = italic;
                info.styles.push(stub);
            }
        }
    }
}
