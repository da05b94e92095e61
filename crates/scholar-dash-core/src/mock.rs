//! Scripted [`AnalysisApi`] for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use crate::api::{AnalysisApi, ApiFuture};
use crate::contracts::Operation;
use crate::error::{ErrorCategory, OperationError};
use crate::{
    CitationSet, ClusterSet, PaperRecord, PdfFile, SimilarityScore, SummaryResult, UploadResult,
};

struct Scripted<T> {
    outcome: Result<T, OperationError>,
    /// When set, the call does not resolve until the sender fires (or is dropped).
    gate: Option<oneshot::Receiver<()>>,
}

/// Queue of responses for one operation, consumed one per call.
pub struct Script<T> {
    operation: Operation,
    queue: Mutex<VecDeque<Scripted<T>>>,
    args: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl<T: Send + 'static> Script<T> {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            queue: Mutex::new(VecDeque::new()),
            args: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, outcome: Result<T, OperationError>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted { outcome, gate: None });
    }

    /// Queue a response that is held until the returned sender fires.
    pub fn push_gated(&self, outcome: Result<T, OperationError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.queue.lock().unwrap().push_back(Scripted {
            outcome,
            gate: Some(rx),
        });
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments received so far, one entry per call.
    pub fn args(&self) -> Vec<String> {
        self.args.lock().unwrap().clone()
    }

    /// Yield until at least `n` calls have been made.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    fn play(&self, arg: String) -> ApiFuture<'_, T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.args.lock().unwrap().push(arg);
        let next = self.queue.lock().unwrap().pop_front();
        let operation = self.operation;
        Box::pin(async move {
            let Some(scripted) = next else {
                return Err(OperationError::Transport {
                    operation,
                    status: None,
                    category: ErrorCategory::Network,
                    message: format!("no scripted response for {}", operation),
                });
            };
            if let Some(gate) = scripted.gate {
                let _ = gate.await;
            }
            scripted.outcome
        })
    }
}

/// Hand-rolled mock with one script per operation.
pub struct MockApi {
    pub upload: Script<UploadResult>,
    pub summarize: Script<SummaryResult>,
    pub citations: Script<CitationSet>,
    pub compare: Script<SimilarityScore>,
    pub papers: Script<Vec<PaperRecord>>,
    pub delete: Script<String>,
    pub cluster: Script<ClusterSet>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            upload: Script::new(Operation::Upload),
            summarize: Script::new(Operation::Summarize),
            citations: Script::new(Operation::ExtractCitations),
            compare: Script::new(Operation::Compare),
            papers: Script::new(Operation::ListPapers),
            delete: Script::new(Operation::DeletePaper),
            cluster: Script::new(Operation::Cluster),
        }
    }
}

impl MockApi {
    /// Total calls across every operation.
    pub fn total_calls(&self) -> usize {
        self.upload.calls()
            + self.summarize.calls()
            + self.citations.calls()
            + self.compare.calls()
            + self.papers.calls()
            + self.delete.calls()
            + self.cluster.calls()
    }
}

impl AnalysisApi for MockApi {
    fn upload<'a>(&'a self, file: &'a PdfFile) -> ApiFuture<'a, UploadResult> {
        self.upload.play(file.filename.clone())
    }

    fn summarize<'a>(&'a self, query: &'a str) -> ApiFuture<'a, SummaryResult> {
        self.summarize.play(query.to_string())
    }

    fn extract_citations<'a>(&'a self, text: &'a str) -> ApiFuture<'a, CitationSet> {
        self.citations.play(text.to_string())
    }

    fn compare<'a>(
        &'a self,
        original: &'a str,
        generated: &'a str,
    ) -> ApiFuture<'a, SimilarityScore> {
        self.compare.play(format!("{original}|{generated}"))
    }

    fn list_papers(&self) -> ApiFuture<'_, Vec<PaperRecord>> {
        self.papers.play(String::new())
    }

    fn delete_paper<'a>(&'a self, filename: &'a str) -> ApiFuture<'a, String> {
        self.delete.play(filename.to_string())
    }

    fn cluster(&self) -> ApiFuture<'_, ClusterSet> {
        self.cluster.play(String::new())
    }
}

/// A backend failure as the transport would report it.
pub fn server_error(operation: Operation, message: &str) -> OperationError {
    OperationError::Transport {
        operation,
        status: Some(500),
        category: ErrorCategory::Server,
        message: message.to_string(),
    }
}
