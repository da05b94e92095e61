use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use scholar_dash_core::controller::CitationReport;
use scholar_dash_core::{
    ClusterSet, Config, Marker, Notice, NoticeLevel, OperationError, PaperRecord, PdfFile,
    SimilarityBand, SimilarityScore, SummaryResult, UploadResult,
};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }

    /// Marker used when highlighting citations in analysed text.
    pub fn citation_marker(&self) -> Marker {
        if self.enabled() {
            Marker::new("\u{1b}[30;43m", "\u{1b}[0m")
        } else {
            Marker::new("[[", "]]")
        }
    }
}

/// Print a notice: a bold title line followed by its description.
pub fn print_notice(w: &mut dyn Write, notice: &Notice, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        let title = match notice.level {
            NoticeLevel::Success => notice.title.green().bold().to_string(),
            NoticeLevel::Error => notice.title.red().bold().to_string(),
            NoticeLevel::Info => notice.title.cyan().bold().to_string(),
        };
        writeln!(w, "{}", title)?;
        writeln!(w, "  {}", notice.description.dimmed())?;
    } else {
        let tag = match notice.level {
            NoticeLevel::Success => "OK",
            NoticeLevel::Error => "ERROR",
            NoticeLevel::Info => "INFO",
        };
        writeln!(w, "[{}] {}", tag, notice.title)?;
        writeln!(w, "  {}", notice.description)?;
    }
    Ok(())
}

/// Print the file about to be uploaded.
pub fn print_selected_file(
    w: &mut dyn Write,
    file: &PdfFile,
    color: ColorMode,
) -> std::io::Result<()> {
    let size = format!("{:.2} MB", file.size_mb());
    if color.enabled() {
        writeln!(w, "Selected {} ({})", file.filename.bold(), size.dimmed())
    } else {
        writeln!(w, "Selected {} ({})", file.filename, size)
    }
}

pub fn print_upload(
    w: &mut dyn Write,
    result: &UploadResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Upload Complete".bold().green())?;
        writeln!(w, "  File:   {}", result.filename.bold())?;
        writeln!(w, "  Chunks: {}", result.chunks.cyan())?;
    } else {
        writeln!(w, "Upload Complete")?;
        writeln!(w, "  File:   {}", result.filename)?;
        writeln!(w, "  Chunks: {}", result.chunks)?;
    }
    Ok(())
}

pub fn print_summary(
    w: &mut dyn Write,
    result: &SummaryResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{} {}", "Query:".bold(), result.query)?;
        writeln!(
            w,
            "{}",
            format!("Based on {} relevant passages", result.context_count).dimmed()
        )?;
    } else {
        writeln!(w, "Query: {}", result.query)?;
        writeln!(w, "Based on {} relevant passages", result.context_count)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", result.summary)?;

    if !result.citations_found.is_empty() {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}", "Citations Found".bold())?;
        } else {
            writeln!(w, "Citations Found")?;
        }
        for citation in &result.citations_found {
            writeln!(w, "  - {}", citation)?;
        }
    }
    Ok(())
}

/// Print extracted citations, optionally followed by the highlighted source text.
pub fn print_citations(
    w: &mut dyn Write,
    report: &CitationReport,
    highlight: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let headline = report.citations.headline();
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", headline.bold())?;
    } else {
        writeln!(w, "{}", headline)?;
    }

    for (i, citation) in report.citations.citations().iter().enumerate() {
        if color.enabled() {
            writeln!(w, "  {} {}", format!("{}.", i + 1).dimmed(), citation.yellow())?;
        } else {
            writeln!(w, "  {}. {}", i + 1, citation)?;
        }
    }

    if highlight && !report.citations.is_empty() {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}", "Highlighted Text".bold())?;
        } else {
            writeln!(w, "Highlighted Text")?;
        }
        writeln!(w, "{}", report.highlighted(&color.citation_marker()))?;
    }
    Ok(())
}

pub fn print_similarity(
    w: &mut dyn Write,
    score: SimilarityScore,
    color: ColorMode,
) -> std::io::Result<()> {
    let band = score.band();
    writeln!(w)?;
    if color.enabled() {
        let percent = match band {
            SimilarityBand::High => score.to_string().green().bold().to_string(),
            SimilarityBand::Moderate => score.to_string().yellow().bold().to_string(),
            SimilarityBand::Low => score.to_string().red().bold().to_string(),
        };
        writeln!(w, "Similarity: {} ({})", percent, band.label())?;
    } else {
        writeln!(w, "Similarity: {} ({})", score, band.label())?;
    }
    writeln!(w, "  {}", similarity_bar(score, 40))?;
    Ok(())
}

/// Fixed-width meter, `#` filled proportionally to the score.
fn similarity_bar(score: SimilarityScore, width: usize) -> String {
    let filled = (usize::from(score.value()) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn print_papers(
    w: &mut dyn Write,
    papers: &[PaperRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    if papers.is_empty() {
        writeln!(w, "No papers uploaded yet.")?;
        return Ok(());
    }

    let heading = format!("Uploaded Papers ({})", papers.len());
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }
    for paper in papers {
        writeln!(w, "  {}", paper.filename)?;
    }
    Ok(())
}

/// Print one line per requested deletion.
pub fn print_delete_outcome(
    w: &mut dyn Write,
    filename: &str,
    outcome: &Result<String, OperationError>,
    color: ColorMode,
) -> std::io::Result<()> {
    match outcome {
        Ok(_) if color.enabled() => {
            writeln!(w, "{} {}", "DELETED".green(), filename)
        }
        Ok(_) => writeln!(w, "DELETED {}", filename),
        Err(err) if color.enabled() => {
            writeln!(w, "{} {}: {}", "FAILED".red(), filename, err.message())
        }
        Err(err) => writeln!(w, "FAILED {}: {}", filename, err.message()),
    }
}

pub fn print_clusters(
    w: &mut dyn Write,
    clusters: &ClusterSet,
    color: ColorMode,
) -> std::io::Result<()> {
    if clusters.is_empty() {
        writeln!(w, "No clusters returned.")?;
        return Ok(());
    }

    for (i, terms) in clusters.groups.iter().enumerate() {
        let label = ClusterSet::label(i);
        if color.enabled() {
            writeln!(w, "{}", label.bold().cyan())?;
        } else {
            writeln!(w, "{}", label)?;
        }
        writeln!(w, "  {}", terms.join(", "))?;
    }
    Ok(())
}

pub fn print_config(
    w: &mut dyn Write,
    config: &Config,
    path: Option<&Path>,
    color: ColorMode,
) -> std::io::Result<()> {
    let path = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no config directory)".to_string());
    if color.enabled() {
        writeln!(w, "{} {}", "Backend:".bold(), config.base_url)?;
        writeln!(w, "{} {}", "Config file:".bold(), path.dimmed())?;
        writeln!(w, "{} {}", "Color:".bold(), color.enabled())?;
    } else {
        writeln!(w, "Backend: {}", config.base_url)?;
        writeln!(w, "Config file: {}", path)?;
        writeln!(w, "Color: {}", color.enabled())?;
    }
    Ok(())
}
