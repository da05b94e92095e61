use std::sync::Arc;

use super::{Slot, ViewState};
use crate::SimilarityScore;
use crate::api::AnalysisApi;
use crate::error::OperationError;

pub struct CompareController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<SimilarityScore>,
}

impl CompareController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
        }
    }

    pub fn state(&self) -> ViewState<SimilarityScore> {
        self.slot.snapshot()
    }

    /// Score how closely `generated` follows `original`.
    pub async fn compare(
        &self,
        original: &str,
        generated: &str,
    ) -> Result<SimilarityScore, OperationError> {
        if original.trim().is_empty() || generated.trim().is_empty() {
            return Err(self.slot.reject(
                "Both texts required",
                "Please provide both original and generated text",
            ));
        }

        let ticket = self.slot.begin(false);
        let outcome = self.api.compare(original, generated).await;
        self.slot
            .complete(ticket, &outcome, |_| None, "Comparison failed");
        outcome
    }
}
