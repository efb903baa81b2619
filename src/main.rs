use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mdocx::config::Config;
use mdocx::convert::{ConversionOptions, ConversionReport, Converter};
use mdocx::diagram::{MermaidCli, render_diagrams};
use mdocx::template::{TemplateLibrary, WordDocumentInfo, analyze_template};

#[derive(Parser)]
#[command(name = "mdocx", version, about = "Convert Markdown to Word using a template's styles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one Markdown file to .docx
    Convert {
        /// Input Markdown file
        input: PathBuf,
        /// Output path (defaults to the input with a .docx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Registered template name or id
        #[arg(short, long)]
        template: Option<String>,
        /// Use a template file directly without registering it
        #[arg(long, value_name = "FILE")]
        template_file: Option<PathBuf>,
        /// Fill missing canonical components with placeholder text
        #[arg(long)]
        complete: bool,
        /// Render mermaid blocks to images via the mermaid CLI
        #[arg(long)]
        render_diagrams: bool,
    },
    /// Convert every .md file in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[arg(short, long)]
        template: Option<String>,
        #[arg(long, value_name = "FILE")]
        template_file: Option<PathBuf>,
        #[arg(long)]
        complete: bool,
    },
    /// Manage the template library
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    /// Analyze a Markdown file and print its detected structure as JSON
    Analyze { input: PathBuf },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Analyze a .docx template and register it
    Add {
        file: PathBuf,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List registered templates
    List,
    /// Search templates by name/description, optionally filtered by tag
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Remove a template by name or id
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Convert {
            input,
            output,
            template,
            template_file,
            complete,
            render_diagrams: render,
        } => {
            let info = resolve_template(&config, template, template_file).await?;
            let options = ConversionOptions {
                complete_missing: complete || config.complete_missing,
            };
            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            let converter = Converter::new(info, options);

            let report = if render {
                let content = tokio::fs::read_to_string(&input)
                    .await
                    .with_context(|| format!("reading {}", input.display()))?;
                let assets = output.with_extension("assets");
                let renderer = MermaidCli::new(&config.mermaid_command);
                let (content, images) = render_diagrams(&content, &renderer, &assets).await?;
                if !images.is_empty() {
                    println!("rendered {} diagram(s) into {}", images.len(), assets.display());
                }
                converter.convert_text(&content, &output)?
            } else {
                converter.convert_file(&input, &output).await?
            };
            print_report(&report);
        }
        Command::Batch {
            input_dir,
            output_dir,
            template,
            template_file,
            complete,
        } => {
            let info = resolve_template(&config, template, template_file).await?;
            let options = ConversionOptions {
                complete_missing: complete || config.complete_missing,
            };
            let report =
                mdocx::batch::convert_directory(&input_dir, &output_dir, info, options).await?;
            println!(
                "converted {}/{} file(s)",
                report.succeeded.len(),
                report.total()
            );
            for (path, reason) in &report.failed {
                println!("  failed: {}: {reason}", path.display());
            }
        }
        Command::Template { command } => {
            let library = TemplateLibrary::open(config.library_root())?;
            run_template_command(&library, command).await?;
        }
        Command::Analyze { input } => {
            let content = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let structure = mdocx::analyze_document(&content);
            println!("{}", serde_json::to_string_pretty(&structure)?);
        }
    }
    Ok(())
}

async fn resolve_template(
    config: &Config,
    name: Option<String>,
    file: Option<PathBuf>,
) -> Result<Arc<WordDocumentInfo>> {
    if let Some(path) = file {
        let analysis = analyze_template(&path).await?;
        for warning in &analysis.warnings {
            warn!(%warning, "template extraction warning");
        }
        return Ok(Arc::new(analysis.info));
    }
    if let Some(name) = name {
        let library = TemplateLibrary::open(config.library_root())?;
        return Ok(Arc::new(library.get(&name)?));
    }
    warn!("no template given, using built-in fallback styles");
    let mut info = WordDocumentInfo::new("builtin");
    info.styles = WordDocumentInfo::fallback_styles();
    Ok(Arc::new(info))
}

async fn run_template_command(library: &TemplateLibrary, command: TemplateCommand) -> Result<()> {
    match command {
        TemplateCommand::Add {
            file,
            name,
            description,
            tags,
        } => {
            let record = library.add(&file, &name, &description, tags).await?;
            println!(
                "registered '{}' as {} ({} styles)",
                record.name, record.id, record.style_count
            );
        }
        TemplateCommand::List => {
            let records = library.list()?;
            if records.is_empty() {
                println!("no templates registered");
            }
            for record in records {
                println!(
                    "{}  {}  {} styles  {}",
                    record.id, record.name, record.style_count, record.description
                );
            }
        }
        TemplateCommand::Search { query, tag } => {
            for record in library.search(&query, tag.as_deref())? {
                println!("{}  {}  {}", record.id, record.name, record.description);
            }
        }
        TemplateCommand::Remove { name } => {
            let record = library.remove(&name)?;
            println!("removed '{}' ({})", record.name, record.id);
        }
    }
    Ok(())
}

fn print_report(report: &ConversionReport) {
    println!("wrote {}", report.output_path.display());
    println!(
        "  document type: {:?}, {} section(s), template '{}', {} ms",
        report.document_type, report.section_count, report.template_name, report.elapsed_ms
    );
    if !report.placeholders_inserted.is_empty() {
        println!(
            "  placeholders inserted for: {:?}",
            report.placeholders_inserted
        );
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}
