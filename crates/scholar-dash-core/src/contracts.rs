//! Request and response shapes for each analysis backend capability.
//!
//! The wire types here mirror the backend's JSON exactly; conversion into
//! the crate's data model happens in [`crate::client`].

use serde::{Deserialize, Serialize};

/// One backend capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Summarize,
    ExtractCitations,
    Compare,
    ListPapers,
    DeletePaper,
    Cluster,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Self::Upload,
        Self::Summarize,
        Self::ExtractCitations,
        Self::Compare,
        Self::ListPapers,
        Self::DeletePaper,
        Self::Cluster,
    ];

    /// Message surfaced when a failure carries no usable message of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::Summarize => "Summarization failed",
            Self::ExtractCitations => "Citation extraction failed",
            Self::Compare => "Comparison failed",
            Self::ListPapers => "Failed to fetch papers",
            Self::DeletePaper => "Delete failed",
            Self::Cluster => "Clustering failed",
        }
    }

    pub fn method(&self) -> reqwest::Method {
        match self {
            Self::Upload | Self::Summarize | Self::ExtractCitations | Self::Compare => {
                reqwest::Method::POST
            }
            Self::ListPapers | Self::Cluster => reqwest::Method::GET,
            Self::DeletePaper => reqwest::Method::DELETE,
        }
    }

    /// Path relative to the base URL. Delete takes the filename as a trailing segment.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Upload => "/upload",
            Self::Summarize => "/summarize",
            Self::ExtractCitations => "/citations",
            Self::Compare => "/compare",
            Self::ListPapers => "/papers",
            Self::DeletePaper => "/delete",
            Self::Cluster => "/cluster",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Summarize => "summarize",
            Self::ExtractCitations => "citations",
            Self::Compare => "compare",
            Self::ListPapers => "papers",
            Self::DeletePaper => "delete",
            Self::Cluster => "cluster",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the multipart field carrying the uploaded PDF.
pub const UPLOAD_FIELD: &str = "file";

// ── Requests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitationsRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompareRequest {
    pub original: String,
    pub generated: String,
}

// ── Responses ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub chunks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeResponse {
    pub query: String,
    pub summary: String,
    pub context_count: u64,
    pub citations_found: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitationsResponse {
    pub citations: Vec<String>,
    pub count: u64,
}

/// The backend may report the percentage as an integer or a float.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareResponse {
    pub similarity_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PapersResponse {
    pub uploaded_papers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterResponse {
    pub clusters: Vec<Vec<String>>,
}
