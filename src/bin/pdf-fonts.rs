//! PDF Fonts CLI tool
//!
//! A command-line tool that lists the fonts used by PDF files.

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::Level;

use pdf_fontscan::{analyze_with, is_pdf, AnalysisOptions, FontRecord, FontReport};

/// PDF Fonts - List the fonts in a PDF and whether they are embedded
#[derive(Parser)]
#[command(name = "pdf-fonts")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # List fonts in a single file
    pdf-fonts report.pdf

    # Check every PDF in a directory, as JSON
    pdf-fonts --json \"handouts/*.pdf\"")]
struct Cli {
    /// PDF files to inspect. Supports glob patterns like "*.pdf"
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Give up on a single font lookup after this many milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Do not scan Form XObjects invoked by pages
    #[arg(long)]
    no_forms: bool,

    /// Do not scan annotation appearances such as filled form fields
    #[arg(long)]
    no_annotations: bool,

    /// Do not read the document information dictionary
    #[arg(long)]
    no_metadata: bool,

    /// Log page and font resolution details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = AnalysisOptions {
        lookup_timeout: Duration::from_millis(cli.timeout_ms),
        follow_form_xobjects: !cli.no_forms,
        include_annotations: !cli.no_annotations,
        read_metadata: !cli.no_metadata,
        ..AnalysisOptions::default()
    };

    let inputs = expand_globs(cli.inputs)?;
    let mut reports = Vec::new();

    for path in &inputs {
        let report = inspect(path, &options)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;

        if cli.json {
            reports.push(serde_json::json!({
                "file": path.display().to_string(),
                "report": report,
            }));
        } else {
            print_report(path, &report);
        }
    }

    if cli.json {
        let output = if reports.len() == 1 {
            reports.remove(0)
        } else {
            serde_json::Value::Array(reports)
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                bail!("No files matched pattern: {}", pattern);
            }
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

fn inspect(path: &Path, options: &AnalysisOptions) -> Result<FontReport> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }

    let bytes = std::fs::read(path)?;
    if !is_pdf(&bytes) {
        bail!("Not a PDF file (no %PDF- header)");
    }

    Ok(analyze_with(&bytes, options)?)
}

fn print_report(path: &Path, report: &FontReport) {
    println!("File: {}", path.display());
    if let Some(metadata) = &report.metadata {
        println!("PDF version: {}", metadata.version);
        if let Some(title) = &metadata.title {
            println!("Title: {}", title);
        }
        if let Some(author) = &metadata.author {
            println!("Author: {}", author);
        }
    }
    println!("Pages scanned: {}", report.pages_scanned);

    for warning in &report.warnings {
        println!("Warning: page {} skipped: {}", warning.page, warning.message);
    }

    if report.fonts.is_empty() {
        println!("No fonts found\n");
        return;
    }

    let embedded: Vec<&FontRecord> = report.embedded().collect();
    let not_embedded: Vec<&FontRecord> = report.not_embedded().collect();

    print_group("Embedded fonts", &embedded);
    print_group("Non-embedded fonts", &not_embedded);
    println!();
}

fn print_group(title: &str, fonts: &[&FontRecord]) {
    if fonts.is_empty() {
        return;
    }

    println!("\n{} ({}):", title, fonts.len());

    let width = fonts.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for font in fonts {
        let kind = match &font.subtype {
            Some(subtype) => format!("{} / {}", font.font_type, subtype),
            None => font.font_type.clone(),
        };
        println!("  {:<width$}  {}", font.name, kind, width = width);
    }
}
