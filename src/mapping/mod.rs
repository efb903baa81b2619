//! Markdown element to template style mapping

pub mod mapper;
pub mod models;

pub use mapper::StyleMapper;
pub use models::{ContextualRule, MarkdownElementType, StyleMapping};
