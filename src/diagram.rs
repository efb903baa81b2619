//! External diagram rendering collaborator
//!
//! Mermaid blocks are rendered by an external CLI; the converter treats the
//! renderer as optional. When rendering is unavailable or fails, the fenced
//! block stays in the document as code, so a missing tool never blocks a
//! conversion. Renders run with a timeout so a hung process cannot stall a
//! batch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

const MERMAID_FENCE: &str = "```mermaid";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders one diagram source to an image file.
pub trait DiagramRenderer: Send + Sync {
    fn render(
        &self,
        source: &str,
        output: &Path,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Mermaid CLI (`mmdc`) invocation.
pub struct MermaidCli {
    command: String,
    timeout: Duration,
}

impl Default for MermaidCli {
    fn default() -> Self {
        MermaidCli {
            command: "mmdc".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MermaidCli {
    pub fn new(command: impl Into<String>) -> Self {
        MermaidCli {
            command: command.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl DiagramRenderer for MermaidCli {
    async fn render(&self, source: &str, output: &Path) -> Result<()> {
        let dir = tempfile::tempdir().context("creating scratch dir for diagram source")?;
        let source_path = dir.path().join("diagram.mmd");
        tokio::fs::write(&source_path, source).await?;

        let run = tokio::process::Command::new(&self.command)
            .arg("-i")
            .arg(&source_path)
            .arg("-o")
            .arg(output)
            .output();

        let out = tokio::time::timeout(self.timeout, run)
            .await
            .context("diagram renderer timed out")??;
        if !out.status.success() {
            bail!(
                "diagram renderer exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Replace renderable mermaid blocks with image references.
///
/// Returns the rewritten Markdown and the list of images produced. Blocks
/// that fail to render are left untouched.
pub async fn render_diagrams<R: DiagramRenderer>(
    markdown: &str,
    renderer: &R,
    assets_dir: &Path,
) -> Result<(String, Vec<PathBuf>)> {
    if !markdown.contains(MERMAID_FENCE) {
        return Ok((markdown.to_string(), Vec::new()));
    }
    tokio::fs::create_dir_all(assets_dir).await?;

    let mut out = String::with_capacity(markdown.len());
    let mut images = Vec::new();
    let mut lines = markdown.lines().peekable();
    let mut index = 0usize;

    while let Some(line) = lines.next() {
        if line.trim() != MERMAID_FENCE {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mut source = String::new();
        for block_line in lines.by_ref() {
            if block_line.trim() == "```" {
                break;
            }
            source.push_str(block_line);
            source.push('\n');
        }

        index += 1;
        let image = assets_dir.join(format!("diagram-{index}.png"));
        match renderer.render(&source, &image).await {
            Ok(()) => {
                debug!(image = %image.display(), "diagram rendered");
                out.push_str(&format!("![图 {index}]({})\n", image.display()));
                images.push(image);
            }
            Err(err) => {
                warn!(error = %err, "diagram render failed, keeping source block");
                out.push_str(MERMAID_FENCE);
                out.push('\n');
                out.push_str(&source);
                out.push_str("```\n");
            }
        }
    }

    Ok((out, images))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRenderer {
        fail: bool,
    }

    impl DiagramRenderer for FakeRenderer {
        async fn render(&self, _source: &str, output: &Path) -> Result<()> {
            if self.fail {
                bail!("renderer unavailable");
            }
            tokio::fs::write(output, b"png").await?;
            Ok(())
        }
    }

    const INPUT: &str = "# 架构\n\n```mermaid\ngraph TD; A-->B;\n```\n\n后续段落。\n";

    #[tokio::test]
    async fn successful_render_replaces_block_with_image() {
        let dir = tempfile::tempdir().unwrap();
        let (rewritten, images) = render_diagrams(INPUT, &FakeRenderer { fail: false }, dir.path())
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
        assert!(images[0].exists());
        assert!(rewritten.contains("![图 1]"));
        assert!(!rewritten.contains("graph TD"));
        assert!(rewritten.contains("后续段落。"));
    }

    #[tokio::test]
    async fn failed_render_keeps_source_block() {
        let dir = tempfile::tempdir().unwrap();
        let (rewritten, images) = render_diagrams(INPUT, &FakeRenderer { fail: true }, dir.path())
            .await
            .unwrap();
        assert!(images.is_empty());
        assert!(rewritten.contains("```mermaid"));
        assert!(rewritten.contains("graph TD; A-->B;"));
    }

    #[tokio::test]
    async fn text_without_diagrams_is_untouched() {
        let (rewritten, images) =
            render_diagrams("普通文本", &FakeRenderer { fail: true }, Path::new("/tmp"))
                .await
                .unwrap();
        assert_eq!(rewritten, "普通文本");
        assert!(images.is_empty());
    }
}
