//! On-disk template library
//!
//! Layout under the library root:
//!
//! ```text
//! templates/
//!   template_index.json        id -> metadata
//!   <id>/
//!     template.docx            copy of the source file
//!     template_config.json     serialized WordDocumentInfo
//!     content_structure.json   paragraph snapshot for completion mode
//! ```
//!
//! Analysis results are cached in memory per library instance, so repeated
//! conversions against the same template read the config file once.

use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConvertError, ConvertResult};

use super::analyzer::{TemplateAnalysis, analyze_template};
use super::models::WordDocumentInfo;

const INDEX_FILE: &str = "template_index.json";
const CONFIG_FILE: &str = "template_config.json";
const STRUCTURE_FILE: &str = "content_structure.json";
const TEMPLATE_FILE: &str = "template.docx";

/// Length of the text preview kept per paragraph in the content snapshot.
const PREVIEW_CHARS: usize = 100;

/// Metadata row in `template_index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub added_at: String,
    pub source_filename: String,
    pub style_count: usize,
}

/// One paragraph of the template, reduced to what completion mode needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    /// First 100 characters of the paragraph text.
    pub preview: String,
    pub style_name: Option<String>,
    pub is_heading: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStructure {
    pub paragraphs: Vec<ContentEntry>,
}

impl ContentStructure {
    /// Snapshot the style inventory as a stand-in structure when the template
    /// body itself is not walked.
    fn from_info(info: &WordDocumentInfo) -> Self {
        let paragraphs = info
            .styles
            .iter()
            .map(|style| ContentEntry {
                preview: style.name.chars().take(PREVIEW_CHARS).collect(),
                style_name: Some(style.name.clone()),
                is_heading: style.name.to_lowercase().contains("heading")
                    || style.name.contains("标题"),
            })
            .collect();
        ContentStructure { paragraphs }
    }
}

/// Directory-backed template store with an in-memory analysis cache.
pub struct TemplateLibrary {
    root: PathBuf,
    cache: Mutex<HashMap<String, WordDocumentInfo>>,
}

impl TemplateLibrary {
    /// Open (or create) a library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> ConvertResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(TemplateLibrary {
            root,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Default location under the platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mdocx")
            .join("templates")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Analyze `source` and register it under `name`.
    pub async fn add(
        &self,
        source: &Path,
        name: &str,
        description: &str,
        tags: Vec<String>,
    ) -> ConvertResult<TemplateRecord> {
        let TemplateAnalysis { info, warnings } = analyze_template(source).await?;
        for warning in &warnings {
            tracing::warn!(template = name, %warning, "template extraction warning");
        }

        let added_at = Utc::now().to_rfc3339();
        let id = template_id(name, &added_at);
        let record = TemplateRecord {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            tags,
            added_at,
            source_filename: info.filename.clone(),
            style_count: info.styles.len(),
        };

        let dir = self.root.join(&id);
        std::fs::create_dir_all(&dir)?;
        std::fs::copy(source, dir.join(TEMPLATE_FILE))?;
        write_json(&dir.join(CONFIG_FILE), &info)?;
        write_json(&dir.join(STRUCTURE_FILE), &ContentStructure::from_info(&info))?;

        let mut index = self.load_index()?;
        index.insert(id.clone(), record.clone());
        self.save_index(&index)?;

        self.cache
            .lock()
            .expect("template cache poisoned")
            .insert(id, info);

        info!(template = name, id = %record.id, "template added to library");
        Ok(record)
    }

    /// Fetch the analyzed configuration for a template by id or name.
    pub fn get(&self, key: &str) -> ConvertResult<WordDocumentInfo> {
        let record = self.resolve(key)?;

        if let Some(info) = self
            .cache
            .lock()
            .expect("template cache poisoned")
            .get(&record.id)
        {
            debug!(id = %record.id, "template config served from cache");
            return Ok(info.clone());
        }

        let config_path = self.root.join(&record.id).join(CONFIG_FILE);
        let content = std::fs::read_to_string(&config_path)?;
        let info: WordDocumentInfo = serde_json::from_str(&content)?;

        self.cache
            .lock()
            .expect("template cache poisoned")
            .insert(record.id.clone(), info.clone());
        Ok(info)
    }

    /// Path to the stored .docx copy for a template.
    pub fn docx_path(&self, key: &str) -> ConvertResult<PathBuf> {
        let record = self.resolve(key)?;
        Ok(self.root.join(&record.id).join(TEMPLATE_FILE))
    }

    pub fn content_structure(&self, key: &str) -> ConvertResult<ContentStructure> {
        let record = self.resolve(key)?;
        let path = self.root.join(&record.id).join(STRUCTURE_FILE);
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All records, ordered by name.
    pub fn list(&self) -> ConvertResult<Vec<TemplateRecord>> {
        let index = self.load_index()?;
        let mut records: Vec<TemplateRecord> = index.into_values().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    /// Case-insensitive substring search over name and description, with an
    /// optional tag filter.
    pub fn search(&self, query: &str, tag: Option<&str>) -> ConvertResult<Vec<TemplateRecord>> {
        let query = query.to_lowercase();
        let mut hits: Vec<TemplateRecord> = self
            .load_index()?
            .into_values()
            .filter(|r| {
                let text_hit = query.is_empty()
                    || r.name.to_lowercase().contains(&query)
                    || r.description.to_lowercase().contains(&query);
                let tag_hit = tag.is_none_or(|t| r.tags.iter().any(|rt| rt == t));
                text_hit && tag_hit
            })
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }

    /// Remove a template and its directory.
    pub fn remove(&self, key: &str) -> ConvertResult<TemplateRecord> {
        let record = self.resolve(key)?;

        let mut index = self.load_index()?;
        index.remove(&record.id);
        self.save_index(&index)?;

        let dir = self.root.join(&record.id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        self.cache
            .lock()
            .expect("template cache poisoned")
            .remove(&record.id);

        info!(template = %record.name, id = %record.id, "template removed");
        Ok(record)
    }

    fn resolve(&self, key: &str) -> ConvertResult<TemplateRecord> {
        let index = self.load_index()?;
        if let Some(record) = index.get(key) {
            return Ok(record.clone());
        }
        index
            .values()
            .find(|r| r.name == key)
            .cloned()
            .ok_or_else(|| ConvertError::UnknownTemplate(key.to_string()))
    }

    fn load_index(&self) -> ConvertResult<BTreeMap<String, TemplateRecord>> {
        let path = self.root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_index(&self, index: &BTreeMap<String, TemplateRecord>) -> ConvertResult<()> {
        write_json(&self.root.join(INDEX_FILE), index)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ConvertResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Opaque id: hash of name + creation timestamp, truncated to 12 hex chars.
fn template_id(name: &str, added_at: &str) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    added_at.hash(&mut hasher);
    format!("{:012x}", hasher.finish() & 0xffff_ffff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample_docx(path: &Path) {
        let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#;
        let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:sz w:val="24"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:rPr><w:b/></w:rPr></w:style>
</w:styles>"#;
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in [
            ("word/document.xml", document),
            ("word/styles.xml", styles),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn add_get_round_trips_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("thesis.docx");
        sample_docx(&source);

        let library = TemplateLibrary::open(dir.path().join("lib")).unwrap();
        let record = library
            .add(&source, "校样模板", "硕士论文格式", vec!["thesis".into()])
            .await
            .unwrap();
        assert_eq!(record.id.len(), 12);
        assert_eq!(record.style_count, 2);

        // By id and by name, cached and uncached.
        let by_id = library.get(&record.id).unwrap();
        let by_name = library.get("校样模板").unwrap();
        assert_eq!(by_id.filename, "thesis.docx");
        assert!(by_name.style_by_id("Heading1").unwrap().bold);
        assert!(library.docx_path(&record.id).unwrap().exists());
    }

    #[tokio::test]
    async fn search_filters_by_text_and_tag() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.docx");
        sample_docx(&source);

        let library = TemplateLibrary::open(dir.path().join("lib")).unwrap();
        library
            .add(&source, "thesis-template", "graduate thesis", vec!["thesis".into()])
            .await
            .unwrap();
        library
            .add(&source, "report-template", "weekly report", vec!["report".into()])
            .await
            .unwrap();

        assert_eq!(library.search("thesis", None).unwrap().len(), 1);
        assert_eq!(library.search("", Some("report")).unwrap().len(), 1);
        assert_eq!(library.search("template", None).unwrap().len(), 2);
        assert!(library.search("nothing", None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_directory_and_index_entry() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("t.docx");
        sample_docx(&source);

        let library = TemplateLibrary::open(dir.path().join("lib")).unwrap();
        let record = library.add(&source, "gone", "", Vec::new()).await.unwrap();
        library.remove(&record.id).unwrap();

        assert!(library.list().unwrap().is_empty());
        assert!(!library.root().join(&record.id).exists());
        assert!(matches!(
            library.get("gone"),
            Err(ConvertError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn unknown_key_is_a_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = TemplateLibrary::open(dir.path()).unwrap();
        assert!(matches!(
            library.get("missing"),
            Err(ConvertError::UnknownTemplate(_))
        ));
    }
}
