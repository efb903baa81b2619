//! Raw-container pass over the template's OOXML parts
//!
//! The document-object API exposes only partially populated style objects, so
//! borders, shading, numbering references, theme data and page geometry are
//! read directly from the ZIP container's XML parts with an event-streaming
//! reader. Each parser is a small state machine; a malformed part degrades to
//! "no data" with a warning instead of failing the analysis.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

use crate::error::ExtractionWarning;

use super::models::{
    Alignment, BorderEdge, NumberingDefinition, NumberingLevel, NumberingRef, PageSetup,
    Shading, StyleKind, WordStyleInfo, half_points_to_points, twips_to_cm,
};

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn attr_i64(e: &BytesStart, name: &str) -> Option<i64> {
    attr(e, name).and_then(|v| v.parse().ok())
}

fn local_name(e: &BytesStart) -> String {
    let name = e.name();
    let raw = String::from_utf8_lossy(name.as_ref()).into_owned();
    raw.split(':').next_back().unwrap_or(&raw).to_string()
}

/// Parse `word/styles.xml` into a complete style inventory.
///
/// Styles that fail attribute extraction are reported through `warnings` and
/// omitted rather than aborting the pass.
pub(crate) fn parse_styles_xml(
    xml: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> Vec<WordStyleInfo> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut styles = Vec::new();
    let mut current: Option<WordStyleInfo> = None;
    // Container elements we are nested inside, to disambiguate shared tags
    // like w:top (border edge) from unrelated ones.
    let mut in_borders = false;
    let mut in_numbering = false;
    let mut pending_num_id: Option<i32> = None;
    let mut pending_num_level: Option<u8> = None;

    let mut buf = Vec::new();
    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(ev) => ev,
            Err(err) => {
                warnings.push(ExtractionWarning::new("styles.xml", err.to_string()));
                break;
            }
        };
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let tag = local_name(&e);
                match tag.as_str() {
                    "style" => {
                        let style_id = attr(&e, "w:styleId").unwrap_or_default();
                        let kind = match attr(&e, "w:type").as_deref() {
                            Some("character") => StyleKind::Character,
                            Some("table") => StyleKind::Table,
                            Some("numbering") => StyleKind::List,
                            _ => StyleKind::Paragraph,
                        };
                        if style_id.is_empty() {
                            warnings.push(ExtractionWarning::new(
                                "styles.xml",
                                "style element without w:styleId skipped",
                            ));
                            current = None;
                        } else {
                            current = Some(WordStyleInfo::new(style_id, "", kind));
                        }
                    }
                    "name" => {
                        if let (Some(style), Some(val)) = (current.as_mut(), attr(&e, "w:val")) {
                            style.name = val;
                        }
                    }
                    "basedOn" => {
                        if let Some(style) = current.as_mut() {
                            style.based_on = attr(&e, "w:val");
                        }
                    }
                    "rFonts" => {
                        if let Some(style) = current.as_mut() {
                            if let Some(ascii) = attr(&e, "w:ascii") {
                                style.font_name = Some(ascii);
                            }
                            if let Some(east_asia) = attr(&e, "w:eastAsia") {
                                style.font_name_east_asia = Some(east_asia);
                            }
                        }
                    }
                    "sz" => {
                        if let (Some(style), Some(half)) = (current.as_mut(), attr_i64(&e, "w:val"))
                        {
                            style.font_size = Some(half_points_to_points(half));
                        }
                    }
                    "b" => set_flag(current.as_mut(), &e, |s, on| s.bold = on),
                    "i" => set_flag(current.as_mut(), &e, |s, on| s.italic = on),
                    "u" => {
                        if let Some(style) = current.as_mut() {
                            style.underline = attr(&e, "w:val").as_deref() != Some("none");
                        }
                    }
                    "color" => {
                        if let (Some(style), Some(val)) = (current.as_mut(), attr(&e, "w:val")) {
                            if val != "auto" {
                                style.font_color = Some(val);
                            }
                        }
                    }
                    "jc" => {
                        if let (Some(style), Some(val)) = (current.as_mut(), attr(&e, "w:val")) {
                            style.alignment = Alignment::from_val(&val);
                        }
                    }
                    "spacing" => {
                        if let Some(style) = current.as_mut() {
                            if let Some(before) = attr_i64(&e, "w:before") {
                                style.space_before = Some(before as f32 / 20.0);
                            }
                            if let Some(after) = attr_i64(&e, "w:after") {
                                style.space_after = Some(after as f32 / 20.0);
                            }
                            if let Some(line) = attr_i64(&e, "w:line") {
                                // 240 line units = single spacing
                                style.line_spacing = Some(line as f32 / 240.0);
                            }
                        }
                    }
                    "ind" => {
                        if let Some(style) = current.as_mut() {
                            if let Some(v) = attr_i64(&e, "w:firstLine") {
                                style.first_line_indent = Some(twips_to_cm(v));
                            }
                            if let Some(v) = attr_i64(&e, "w:left") {
                                style.left_indent = Some(twips_to_cm(v));
                            }
                            if let Some(v) = attr_i64(&e, "w:right") {
                                style.right_indent = Some(twips_to_cm(v));
                            }
                            if let Some(v) = attr_i64(&e, "w:hanging") {
                                style.hanging_indent = Some(twips_to_cm(v));
                            }
                        }
                    }
                    "pBdr" => in_borders = true,
                    "top" | "bottom" | "left" | "right" if in_borders => {
                        if let Some(style) = current.as_mut() {
                            let edge = BorderEdge {
                                val: attr(&e, "w:val"),
                                size: attr_i64(&e, "w:sz").map(|v| v as u32),
                                color: attr(&e, "w:color"),
                            };
                            let borders = &mut style.borders;
                            match tag.as_str() {
                                "top" => borders.top = Some(edge),
                                "bottom" => borders.bottom = Some(edge),
                                "left" => borders.left = Some(edge),
                                _ => borders.right = Some(edge),
                            }
                        }
                    }
                    "shd" => {
                        if let Some(style) = current.as_mut() {
                            style.shading = Some(Shading {
                                val: attr(&e, "w:val"),
                                color: attr(&e, "w:color"),
                                fill: attr(&e, "w:fill"),
                            });
                        }
                    }
                    "numPr" => in_numbering = true,
                    "numId" if in_numbering => {
                        pending_num_id = attr_i64(&e, "w:val").map(|v| v as i32);
                    }
                    "ilvl" if in_numbering => {
                        pending_num_level = attr_i64(&e, "w:val").map(|v| v as u8);
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = e.name();
                let tag = String::from_utf8_lossy(name.as_ref()).into_owned();
                match tag.rsplit(':').next().unwrap_or(&tag) {
                    "pBdr" => in_borders = false,
                    "numPr" => {
                        in_numbering = false;
                        if let (Some(style), Some(num_id)) = (current.as_mut(), pending_num_id) {
                            style.numbering = Some(NumberingRef {
                                num_id,
                                level: pending_num_level.unwrap_or(0),
                            });
                        }
                        pending_num_id = None;
                        pending_num_level = None;
                    }
                    "style" => {
                        if let Some(mut style) = current.take() {
                            if style.name.is_empty() {
                                style.name = style.style_id.clone();
                            }
                            styles.push(style);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    styles
}

/// Toggle flags like `<w:b/>` / `<w:b w:val="false"/>`.
fn set_flag(style: Option<&mut WordStyleInfo>, e: &BytesStart, apply: fn(&mut WordStyleInfo, bool)) {
    if let Some(style) = style {
        let on = !matches!(attr(e, "w:val").as_deref(), Some("false") | Some("0") | Some("none"));
        apply(style, on);
    }
}

/// Parse `word/numbering.xml` abstract numbering definitions.
pub(crate) fn parse_numbering_xml(
    xml: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> BTreeMap<i32, NumberingDefinition> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut definitions = BTreeMap::new();
    let mut current_def: Option<NumberingDefinition> = None;
    let mut current_level: Option<NumberingLevel> = None;

    let mut buf = Vec::new();
    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(ev) => ev,
            Err(err) => {
                warnings.push(ExtractionWarning::new("numbering.xml", err.to_string()));
                break;
            }
        };
        match event {
            Event::Start(e) | Event::Empty(e) => match local_name(&e).as_str() {
                "abstractNum" => {
                    if let Some(id) = attr_i64(&e, "w:abstractNumId") {
                        current_def = Some(NumberingDefinition {
                            abstract_num_id: id as i32,
                            levels: Vec::new(),
                        });
                    }
                }
                "lvl" => {
                    if current_def.is_some() {
                        current_level = Some(NumberingLevel {
                            level: attr_i64(&e, "w:ilvl").unwrap_or(0) as u8,
                            ..NumberingLevel::default()
                        });
                    }
                }
                "start" => {
                    if let Some(level) = current_level.as_mut() {
                        level.start = attr_i64(&e, "w:val").map(|v| v as i32);
                    }
                }
                "numFmt" => {
                    if let Some(level) = current_level.as_mut() {
                        level.format = attr(&e, "w:val");
                    }
                }
                "lvlText" => {
                    if let Some(level) = current_level.as_mut() {
                        level.text = attr(&e, "w:val");
                    }
                }
                "lvlJc" => {
                    if let Some(level) = current_level.as_mut() {
                        level.alignment = attr(&e, "w:val");
                    }
                }
                _ => {}
            },
            Event::End(e) => {
                let name = e.name();
                let raw = String::from_utf8_lossy(name.as_ref()).into_owned();
                match raw.rsplit(':').next().unwrap_or(&raw) {
                    "lvl" => {
                        if let (Some(def), Some(level)) = (current_def.as_mut(), current_level.take())
                        {
                            def.levels.push(level);
                        }
                    }
                    "abstractNum" => {
                        if let Some(def) = current_def.take() {
                            definitions.insert(def.abstract_num_id, def);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    definitions
}

/// Theme color scheme and major/minor latin typefaces from theme1.xml.
pub(crate) fn parse_theme_xml(
    xml: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut colors = BTreeMap::new();
    let mut fonts = BTreeMap::new();
    let mut in_color_scheme = false;
    let mut current_slot: Option<String> = None;
    // "major" or "minor" while inside the matching font element.
    let mut font_slot: Option<&'static str> = None;

    let mut buf = Vec::new();
    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(ev) => ev,
            Err(err) => {
                warnings.push(ExtractionWarning::new("theme1.xml", err.to_string()));
                break;
            }
        };
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let tag = local_name(&e);
                match tag.as_str() {
                    "clrScheme" => in_color_scheme = true,
                    "srgbClr" if in_color_scheme => {
                        if let (Some(slot), Some(val)) = (current_slot.as_ref(), attr(&e, "val")) {
                            colors.insert(slot.clone(), val);
                        }
                    }
                    "sysClr" if in_color_scheme => {
                        if let Some(slot) = current_slot.as_ref() {
                            if let Some(val) = attr(&e, "lastClr").or_else(|| attr(&e, "val")) {
                                colors.insert(slot.clone(), val);
                            }
                        }
                    }
                    "majorFont" => font_slot = Some("major"),
                    "minorFont" => font_slot = Some("minor"),
                    "latin" => {
                        if let (Some(slot), Some(face)) = (font_slot, attr(&e, "typeface")) {
                            fonts.insert(slot.to_string(), face);
                        }
                    }
                    _ if in_color_scheme && current_slot.is_none() => {
                        current_slot = Some(tag);
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = e.name();
                let raw = String::from_utf8_lossy(name.as_ref()).into_owned();
                let tag = raw.rsplit(':').next().unwrap_or(&raw).to_string();
                match tag.as_str() {
                    "clrScheme" => in_color_scheme = false,
                    "majorFont" | "minorFont" => font_slot = None,
                    _ => {
                        if current_slot.as_deref() == Some(tag.as_str()) {
                            current_slot = None;
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    (colors, fonts)
}

/// Whether settings.xml declares different odd/even page headers.
pub(crate) fn parse_settings_xml(xml: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if local_name(&e) == "evenAndOddHeaders" {
                    return true;
                }
            }
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
        buf.clear();
    }
}

/// Page geometry from the body-level sectPr in word/document.xml.
pub(crate) fn parse_page_setup(document_xml: &str) -> Option<PageSetup> {
    let mut reader = Reader::from_str(document_xml);
    reader.config_mut().trim_text(true);

    let mut setup = PageSetup::default();
    let mut found = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match local_name(&e).as_str() {
                "pgSz" => {
                    if let Some(w) = attr_i64(&e, "w:w") {
                        setup.width = twips_to_cm(w);
                        found = true;
                    }
                    if let Some(h) = attr_i64(&e, "w:h") {
                        setup.height = twips_to_cm(h);
                    }
                }
                "pgMar" => {
                    if let Some(v) = attr_i64(&e, "w:top") {
                        setup.margin_top = twips_to_cm(v);
                        found = true;
                    }
                    if let Some(v) = attr_i64(&e, "w:bottom") {
                        setup.margin_bottom = twips_to_cm(v);
                    }
                    if let Some(v) = attr_i64(&e, "w:left") {
                        setup.margin_left = twips_to_cm(v);
                    }
                    if let Some(v) = attr_i64(&e, "w:right") {
                        setup.margin_right = twips_to_cm(v);
                    }
                    setup.header_distance = attr_i64(&e, "w:header").map(twips_to_cm);
                    setup.footer_distance = attr_i64(&e, "w:footer").map(twips_to_cm);
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    found.then_some(setup)
}
