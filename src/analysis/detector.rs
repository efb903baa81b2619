//! Whole-document type detection
//!
//! A scored heuristic rather than a hard rule: misclassification degrades
//! formatting quality but never corrupts content, so the thresholds are
//! deliberately coarse.

use super::models::DocumentType;
use super::patterns;

const WEIGHT_ACADEMIC_CN: u32 = 2;
const WEIGHT_ACADEMIC_EN: u32 = 1;
const BONUS_THESIS_MARKER: u32 = 10;
const BONUS_DUAL_ABSTRACT: u32 = 5;
const BONUS_CODE_BLOCK: u32 = 3;

const THRESHOLD_THESIS: u32 = 10;
const THRESHOLD_PAPER: u32 = 5;
const THRESHOLD_TECHNICAL: u32 = 5;
const THRESHOLD_BUSINESS: u32 = 3;

/// Classify the whole document from keyword density and structural markers.
pub fn detect_document_type(content: &str) -> DocumentType {
    let scores = score_document(content);

    if scores.academic >= THRESHOLD_THESIS {
        DocumentType::AcademicThesis
    } else if scores.academic >= THRESHOLD_PAPER {
        DocumentType::ResearchPaper
    } else if scores.technical >= THRESHOLD_TECHNICAL {
        DocumentType::TechnicalReport
    } else if scores.business >= THRESHOLD_BUSINESS {
        DocumentType::BusinessReport
    } else {
        DocumentType::GeneralDocument
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DocumentScores {
    pub academic: u32,
    pub technical: u32,
    pub business: u32,
}

pub(crate) fn score_document(content: &str) -> DocumentScores {
    let content_lower = content.to_lowercase();
    let mut scores = DocumentScores::default();

    for keyword in patterns::ACADEMIC_KEYWORDS_CN {
        if content.contains(keyword) {
            scores.academic += WEIGHT_ACADEMIC_CN;
        }
    }
    for keyword in patterns::ACADEMIC_KEYWORDS_EN {
        if content_lower.contains(keyword) {
            scores.academic += WEIGHT_ACADEMIC_EN;
        }
    }
    if patterns::THESIS_MARKERS.iter().any(|m| content.contains(m)) {
        scores.academic += BONUS_THESIS_MARKER;
    }
    if patterns::ABSTRACT_CN.is_match(content) && patterns::ABSTRACT_EN.is_match(content) {
        scores.academic += BONUS_DUAL_ABSTRACT;
    }

    for keyword in patterns::TECHNICAL_KEYWORDS {
        if content_lower.contains(keyword) {
            scores.technical += 1;
        }
    }
    if patterns::CODE_BLOCK.is_match(content) {
        scores.technical += BONUS_CODE_BLOCK;
    }

    for keyword in patterns::BUSINESS_KEYWORDS {
        if content_lower.contains(keyword) {
            scores.business += 1;
        }
    }

    scores
}
