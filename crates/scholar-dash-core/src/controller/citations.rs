use std::sync::Arc;

use super::{Notice, Slot, ViewState};
use crate::CitationSet;
use crate::api::AnalysisApi;
use crate::error::OperationError;
use crate::highlight::{Marker, highlight_citations};

/// Citations extracted from a piece of text, together with that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationReport {
    pub text: String,
    pub citations: CitationSet,
}

impl CitationReport {
    /// The analysed text with every citation wrapped in `marker`.
    pub fn highlighted(&self, marker: &Marker) -> String {
        highlight_citations(&self.text, self.citations.citations(), marker)
    }
}

pub struct CitationsController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<CitationReport>,
}

impl CitationsController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
        }
    }

    pub fn state(&self) -> ViewState<CitationReport> {
        self.slot.snapshot()
    }

    /// Highlighted view of the last successful extraction.
    pub fn highlighted(&self, marker: &Marker) -> Option<String> {
        self.slot
            .snapshot()
            .result
            .map(|report| report.highlighted(marker))
    }

    /// Extract citations from `text`. Zero citations is a success with an
    /// informational notice.
    pub async fn extract(&self, text: &str) -> Result<CitationReport, OperationError> {
        if text.trim().is_empty() {
            return Err(self.slot.reject(
                "Text Required",
                "Please paste some text to extract citations.",
            ));
        }

        // The previous result belongs to different text; drop it now.
        let ticket = self.slot.begin(true);
        let outcome = self
            .api
            .extract_citations(text)
            .await
            .map(|citations| CitationReport {
                text: text.to_string(),
                citations,
            });
        self.slot.complete(
            ticket,
            &outcome,
            |report| {
                report.citations.is_empty().then(|| {
                    Notice::info(
                        "No Citations Found",
                        "The text doesn't contain any recognizable citations.",
                    )
                })
            },
            "Extraction Failed",
        );
        outcome
    }
}
