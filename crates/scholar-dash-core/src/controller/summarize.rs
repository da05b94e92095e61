use std::sync::Arc;

use super::{Slot, ViewState};
use crate::SummaryResult;
use crate::api::AnalysisApi;
use crate::error::OperationError;

pub struct SummarizeController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<SummaryResult>,
}

impl SummarizeController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
        }
    }

    pub fn state(&self) -> ViewState<SummaryResult> {
        self.slot.snapshot()
    }

    /// Ask the backend to summarize the uploaded papers with respect to `query`.
    pub async fn summarize(&self, query: &str) -> Result<SummaryResult, OperationError> {
        if query.trim().is_empty() {
            return Err(self
                .slot
                .reject("Query required", "Please enter a question or topic"));
        }

        let ticket = self.slot.begin(false);
        let outcome = self.api.summarize(query).await;
        self.slot
            .complete(ticket, &outcome, |_| None, "Summarization failed");
        outcome
    }
}
