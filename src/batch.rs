//! Batch directory conversion
//!
//! Converts every `.md` file in a directory against one shared template
//! analysis. Files are independent, so conversions fan out as tokio tasks;
//! a failing file is recorded in the results map and never aborts siblings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::convert::{ConversionOptions, ConversionReport, Converter};
use crate::error::ConvertResult;
use crate::template::WordDocumentInfo;

/// Per-file results keyed by input path.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: BTreeMap<PathBuf, ConversionReport>,
    pub failed: BTreeMap<PathBuf, String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Convert every Markdown file in `input_dir` into `output_dir`.
pub async fn convert_directory(
    input_dir: &Path,
    output_dir: &Path,
    template: Arc<WordDocumentInfo>,
    options: ConversionOptions,
) -> ConvertResult<BatchReport> {
    let inputs = markdown_files(input_dir)?;
    tokio::fs::create_dir_all(output_dir).await?;
    info!(files = inputs.len(), dir = %input_dir.display(), "batch conversion starting");

    let mut tasks = JoinSet::new();
    for input in inputs {
        let template = Arc::clone(&template);
        let output = output_dir
            .join(input.file_stem().unwrap_or_default())
            .with_extension("docx");
        tasks.spawn(async move {
            let converter = Converter::new(template, options);
            let result = converter.convert_file(&input, &output).await;
            (input, result)
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((input, Ok(conversion))) => {
                report.succeeded.insert(input, conversion);
            }
            Ok((input, Err(err))) => {
                error!(input = %input.display(), error = %err, "file conversion failed");
                report.failed.insert(input, err.to_string());
            }
            Err(join_err) => {
                error!(error = %join_err, "conversion task panicked");
            }
        }
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "batch conversion finished"
    );
    Ok(report)
}

fn markdown_files(dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("md"))
        })
        .collect();
    files.sort();
    Ok(files)
}
