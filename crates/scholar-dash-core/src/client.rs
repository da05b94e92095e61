//! HTTP transport to the analysis backend.
//!
//! One round trip per call. Every outcome is normalized into either the
//! operation's typed result or an [`OperationError`].

use std::collections::HashSet;

use serde::de::DeserializeOwned;

use crate::api::{AnalysisApi, ApiFuture};
use crate::contracts::{
    CitationsRequest, CitationsResponse, ClusterResponse, CompareRequest, CompareResponse,
    DeleteResponse, Operation, PapersResponse, SummarizeRequest, SummarizeResponse, UPLOAD_FIELD,
    UploadResponse,
};
use crate::error::{ConfigError, OperationError, extract_error_message};
use crate::{
    CitationSet, ClusterSet, Config, PaperRecord, PdfFile, SimilarityScore, SummaryResult,
    UploadResult,
};

/// Client for the analysis backend.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Build a client for `config.base_url`. The URL must be absolute http(s);
    /// trailing slashes are dropped.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("scholar-dash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    fn delete_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.url(Operation::DeletePaper),
            urlencoding::encode(filename)
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, OperationError> {
        tracing::debug!(%operation, "sending request");
        let resp = request.send().await.map_err(|e| {
            tracing::warn!(%operation, error = %e, "request failed before a response");
            OperationError::network(operation, &e)
        })?;
        let decoded = decode_response(operation, resp).await?;
        tracing::info!(%operation, "operation completed");
        Ok(decoded)
    }
}

/// Turn a response into the operation's declared shape.
///
/// A non-success status is always a failure, whatever the body says. The
/// body only contributes the message.
pub async fn decode_response<T: DeserializeOwned>(
    operation: Operation,
    resp: reqwest::Response,
) -> Result<T, OperationError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.bytes().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| operation.fallback_message().to_string());
        tracing::warn!(%operation, status = status.as_u16(), %message, "backend returned an error");
        return Err(OperationError::from_status(operation, status, message));
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| OperationError::network(operation, &e))?;
    serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(%operation, error = %e, "malformed success body");
        OperationError::decoding(operation, e)
    })
}

impl AnalysisApi for AnalysisClient {
    fn upload<'a>(&'a self, file: &'a PdfFile) -> ApiFuture<'a, UploadResult> {
        Box::pin(async move {
            let op = Operation::Upload;
            let part = reqwest::multipart::Part::bytes(file.data.clone())
                .file_name(file.filename.clone())
                .mime_str("application/pdf")
                .map_err(|e| OperationError::network(op, &e))?;
            let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

            let resp: UploadResponse = self
                .send(op, self.http.request(op.method(), self.url(op)).multipart(form))
                .await?;
            Ok(UploadResult {
                filename: resp.filename,
                chunks: resp.chunks,
                message: resp.message,
            })
        })
    }

    fn summarize<'a>(&'a self, query: &'a str) -> ApiFuture<'a, SummaryResult> {
        Box::pin(async move {
            let op = Operation::Summarize;
            let body = SummarizeRequest {
                query: query.to_string(),
            };
            let resp: SummarizeResponse = self
                .send(op, self.http.request(op.method(), self.url(op)).json(&body))
                .await?;
            Ok(SummaryResult {
                query: resp.query,
                summary: resp.summary,
                context_count: resp.context_count,
                citations_found: resp.citations_found,
            })
        })
    }

    fn extract_citations<'a>(&'a self, text: &'a str) -> ApiFuture<'a, CitationSet> {
        Box::pin(async move {
            let op = Operation::ExtractCitations;
            let body = CitationsRequest {
                text: text.to_string(),
            };
            let resp: CitationsResponse = self
                .send(op, self.http.request(op.method(), self.url(op)).json(&body))
                .await?;
            if resp.count != resp.citations.len() as u64 {
                tracing::warn!(
                    reported = resp.count,
                    listed = resp.citations.len(),
                    "citation count disagrees with list; using list length"
                );
            }
            Ok(CitationSet::new(resp.citations))
        })
    }

    fn compare<'a>(
        &'a self,
        original: &'a str,
        generated: &'a str,
    ) -> ApiFuture<'a, SimilarityScore> {
        Box::pin(async move {
            let op = Operation::Compare;
            let body = CompareRequest {
                original: original.to_string(),
                generated: generated.to_string(),
            };
            let resp: CompareResponse = self
                .send(op, self.http.request(op.method(), self.url(op)).json(&body))
                .await?;
            SimilarityScore::from_percent(resp.similarity_percent).ok_or_else(|| {
                OperationError::decoding(
                    op,
                    format!(
                        "similarity_percent {} is outside 0..=100",
                        resp.similarity_percent
                    ),
                )
            })
        })
    }

    fn list_papers(&self) -> ApiFuture<'_, Vec<PaperRecord>> {
        Box::pin(async move {
            let op = Operation::ListPapers;
            let resp: PapersResponse = self
                .send(op, self.http.request(op.method(), self.url(op)))
                .await?;
            Ok(unique_records(resp.uploaded_papers))
        })
    }

    fn delete_paper<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let op = Operation::DeletePaper;
            let resp: DeleteResponse = self
                .send(op, self.http.request(op.method(), self.delete_url(filename)))
                .await?;
            Ok(resp.message)
        })
    }

    fn cluster(&self) -> ApiFuture<'_, ClusterSet> {
        Box::pin(async move {
            let op = Operation::Cluster;
            let resp: ClusterResponse = self
                .send(op, self.http.request(op.method(), self.url(op)))
                .await?;
            Ok(ClusterSet {
                groups: resp.clusters,
            })
        })
    }
}

/// Collapse duplicate filenames, keeping the first occurrence.
fn unique_records(filenames: Vec<String>) -> Vec<PaperRecord> {
    let mut seen = HashSet::new();
    filenames
        .into_iter()
        .filter(|name| {
            let fresh = seen.insert(name.clone());
            if !fresh {
                tracing::debug!(filename = %name, "duplicate filename in listing");
            }
            fresh
        })
        .map(|filename| PaperRecord { filename })
        .collect()
}
