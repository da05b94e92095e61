use std::path::Path;

pub mod api;
pub mod client;
pub mod config_file;
pub mod contracts;
pub mod controller;
pub mod error;
pub mod highlight;

#[cfg(test)]
mod mock;

// Re-export for convenience
pub use api::AnalysisApi;
pub use client::AnalysisClient;
pub use contracts::Operation;
pub use controller::{Notice, NoticeLevel, Phase, ViewState};
pub use error::{ConfigError, ErrorCategory, OperationError};
pub use highlight::{Marker, escape_literal, highlight_citations};

/// Backend used when neither the environment nor a config file names one.
pub const DEFAULT_BASE_URL: &str = "https://research-app-10.onrender.com";

/// Environment variable consulted for the backend base URL.
pub const BASE_URL_ENV: &str = "SCHOLAR_DASH_API_URL";

/// Process-wide configuration, resolved once at startup and handed to
/// [`AnalysisClient::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Resolve the base URL: explicit flag > environment > config file > default.
    pub fn resolve(
        flag: Option<String>,
        env: Option<String>,
        file: &config_file::ConfigFile,
    ) -> Self {
        let from_file = file.backend.as_ref().and_then(|b| b.base_url.clone());
        let base_url = [flag, env, from_file]
            .into_iter()
            .flatten()
            .map(|u| u.trim().to_string())
            .find(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }

    /// Resolve from the process environment and the on-disk config cascade.
    pub fn from_env(flag: Option<String>) -> Self {
        let file = config_file::load_config();
        Self::resolve(flag, std::env::var(BASE_URL_ENV).ok(), &file)
    }
}

/// A PDF held in memory, ready to be sent as the `file` multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl PdfFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a file from disk. The name sent to the backend is the final path component.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, data })
    }

    /// Extension is `.pdf` (any case) and the content carries the PDF magic bytes.
    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf") && self.data.starts_with(b"%PDF-")
    }

    /// Size in mebibytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / 1024.0 / 1024.0
    }
}

/// Outcome of a PDF ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub filename: String,
    pub chunks: u64,
    /// Status message from the backend, shown as the success notice.
    pub message: String,
}

/// Answer to a query over the uploaded papers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub query: String,
    pub summary: String,
    pub context_count: u64,
    /// Raw substrings as reported by the backend; not deduplicated.
    pub citations_found: Vec<String>,
}

/// Citations extracted from free text, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationSet {
    citations: Vec<String>,
}

impl CitationSet {
    pub fn new(citations: Vec<String>) -> Self {
        Self { citations }
    }

    pub fn citations(&self) -> &[String] {
        &self.citations
    }

    pub fn count(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    /// "Found 1 Citation" / "Found 3 Citations".
    pub fn headline(&self) -> String {
        let n = self.count();
        format!("Found {} Citation{}", n, if n == 1 { "" } else { "s" })
    }
}

/// Qualitative band of a similarity score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBand {
    High,
    Moderate,
    Low,
}

impl SimilarityBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Similarity",
            Self::Moderate => "Moderate Similarity",
            Self::Low => "Low Similarity",
        }
    }
}

/// Lexical closeness of two texts, as an integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimilarityScore(u8);

impl SimilarityScore {
    pub fn new(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    /// Round a backend-reported percentage. Returns `None` for NaN,
    /// infinities and anything that rounds outside `0..=100`.
    pub fn from_percent(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round();
        if !(0.0..=100.0).contains(&rounded) {
            return None;
        }
        Some(Self(rounded as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn band(&self) -> SimilarityBand {
        match self.0 {
            80.. => SimilarityBand::High,
            60..=79 => SimilarityBand::Moderate,
            _ => SimilarityBand::Low,
        }
    }
}

impl std::fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// An uploaded document known to the backend. Filenames are unique within a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaperRecord {
    pub filename: String,
}

/// Groups of related terms produced by the backend's topic clustering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSet {
    pub groups: Vec<Vec<String>>,
}

impl ClusterSet {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Display label for the group at `index` ("Topic Cluster 1", ...).
    pub fn label(index: usize) -> String {
        format!("Topic Cluster {}", index + 1)
    }
}
