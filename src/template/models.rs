//! Data structures describing an analyzed Word template
//!
//! Constructed once per template analysis, serialized into the template
//! library, and shared read-only across conversions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1 cm = 566.929 twips.
const TWIPS_PER_CM: f64 = 566.929;

pub fn twips_to_cm(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_CM
}

pub fn cm_to_twips(cm: f64) -> i32 {
    (cm * TWIPS_PER_CM).round() as i32
}

/// Font sizes in styles.xml are stored in half-points.
pub fn half_points_to_points(half_points: i64) -> f32 {
    half_points as f32 / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

impl Alignment {
    pub(crate) fn from_val(val: &str) -> Option<Alignment> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "justify" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            _ => None,
        }
    }
}

/// One edge of a paragraph border.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderEdge {
    pub val: Option<String>,
    /// Width in eighths of a point, as stored in the container.
    pub size: Option<u32>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shading {
    pub val: Option<String>,
    pub color: Option<String>,
    pub fill: Option<String>,
}

/// Reference from a style into the numbering definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    pub num_id: i32,
    pub level: u8,
}

/// A named style extracted from the template, with attributes merged from the
/// object-model pass and the raw styles.xml pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordStyleInfo {
    pub style_id: String,
    pub name: String,
    pub style_type: StyleKind,

    // Font attributes
    pub font_name: Option<String>,
    pub font_name_east_asia: Option<String>,
    /// Points.
    pub font_size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Hex RGB without the leading '#'.
    pub font_color: Option<String>,

    // Paragraph attributes
    pub alignment: Option<Alignment>,
    /// Points.
    pub space_before: Option<f32>,
    /// Points.
    pub space_after: Option<f32>,
    /// Multiple of single spacing (240 line units = 1.0).
    pub line_spacing: Option<f32>,
    /// Centimeters.
    pub first_line_indent: Option<f64>,
    pub left_indent: Option<f64>,
    pub right_indent: Option<f64>,
    pub hanging_indent: Option<f64>,

    pub numbering: Option<NumberingRef>,
    pub borders: Borders,
    pub shading: Option<Shading>,
    pub based_on: Option<String>,
}

impl WordStyleInfo {
    pub fn new(style_id: impl Into<String>, name: impl Into<String>, style_type: StyleKind) -> Self {
        WordStyleInfo {
            style_id: style_id.into(),
            name: name.into(),
            style_type,
            font_name: None,
            font_name_east_asia: None,
            font_size: None,
            bold: false,
            italic: false,
            underline: false,
            font_color: None,
            alignment: None,
            space_before: None,
            space_after: None,
            line_spacing: None,
            first_line_indent: None,
            left_indent: None,
            right_indent: None,
            hanging_indent: None,
            numbering: None,
            borders: Borders::default(),
            shading: None,
            based_on: None,
        }
    }
}

/// One level of an abstract numbering definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingLevel {
    pub level: u8,
    pub start: Option<i32>,
    /// decimal, lowerLetter, upperRoman, bullet, ...
    pub format: Option<String>,
    /// Level text template, e.g. "%1.%2".
    pub text: Option<String>,
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingDefinition {
    pub abstract_num_id: i32,
    pub levels: Vec<NumberingLevel>,
}

/// Page geometry in centimeters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub header_distance: Option<f64>,
    pub footer_distance: Option<f64>,
}

impl Default for PageSetup {
    fn default() -> Self {
        // A4 portrait with 2.54 cm margins.
        PageSetup {
            width: twips_to_cm(11906),
            height: twips_to_cm(16838),
            margin_top: twips_to_cm(1440),
            margin_bottom: twips_to_cm(1440),
            margin_left: twips_to_cm(1440),
            margin_right: twips_to_cm(1440),
            header_distance: None,
            footer_distance: None,
        }
    }
}

/// Complete analysis result for one template document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordDocumentInfo {
    pub filename: String,
    pub page_setup: PageSetup,
    pub different_odd_even_headers: bool,
    pub styles: Vec<WordStyleInfo>,
    /// Keyed by abstract numbering id.
    pub numbering_definitions: BTreeMap<i32, NumberingDefinition>,
    /// Theme color scheme, keyed by slot name (dk1, lt1, accent1, ...).
    pub theme_colors: BTreeMap<String, String>,
    /// Major/minor latin typefaces from the theme font scheme.
    pub font_scheme: BTreeMap<String, String>,
}

impl WordDocumentInfo {
    pub fn new(filename: impl Into<String>) -> Self {
        WordDocumentInfo {
            filename: filename.into(),
            page_setup: PageSetup::default(),
            different_odd_even_headers: false,
            styles: Vec::new(),
            numbering_definitions: BTreeMap::new(),
            theme_colors: BTreeMap::new(),
            font_scheme: BTreeMap::new(),
        }
    }

    pub fn style_by_id(&self, style_id: &str) -> Option<&WordStyleInfo> {
        self.styles.iter().find(|s| s.style_id == style_id)
    }

    pub fn style_by_name(&self, name: &str) -> Option<&WordStyleInfo> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Minimal built-in inventory used when a template yields no styles at all.
    pub fn fallback_styles() -> Vec<WordStyleInfo> {
        let mut normal = WordStyleInfo::new("Normal", "Normal", StyleKind::Paragraph);
        normal.font_size = Some(12.0);
        normal.font_name_east_asia = Some("宋体".to_string());

        let mut styles = vec![normal];
        for level in 1..=6u8 {
            let id = format!("Heading{level}");
            let mut style = WordStyleInfo::new(&id, format!("Heading {level}"), StyleKind::Paragraph);
            style.bold = true;
            style.font_size = Some(match level {
                1 => 16.0,
                2 => 14.0,
                _ => 12.0,
            });
            styles.push(style);
        }
        styles
    }
}
