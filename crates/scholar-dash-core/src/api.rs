//! The seam between the controllers and the network.

use std::future::Future;
use std::pin::Pin;

use crate::error::OperationError;
use crate::{CitationSet, ClusterSet, PaperRecord, PdfFile, SimilarityScore, SummaryResult, UploadResult};

/// Boxed future returned by every [`AnalysisApi`] method.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, OperationError>> + Send + 'a>>;

/// One method per analysis backend capability. Each call is exactly one
/// attempt: no retries and no timeouts beyond the transport's defaults.
pub trait AnalysisApi: Send + Sync {
    fn upload<'a>(&'a self, file: &'a PdfFile) -> ApiFuture<'a, UploadResult>;

    fn summarize<'a>(&'a self, query: &'a str) -> ApiFuture<'a, SummaryResult>;

    fn extract_citations<'a>(&'a self, text: &'a str) -> ApiFuture<'a, CitationSet>;

    fn compare<'a>(&'a self, original: &'a str, generated: &'a str)
    -> ApiFuture<'a, SimilarityScore>;

    fn list_papers(&self) -> ApiFuture<'_, Vec<PaperRecord>>;

    /// Returns the backend's confirmation message.
    fn delete_paper<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String>;

    fn cluster(&self) -> ApiFuture<'_, ClusterSet>;
}
