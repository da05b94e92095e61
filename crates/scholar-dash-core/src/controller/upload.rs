use std::sync::{Arc, Mutex};

use super::{Notice, Slot, ViewState};
use crate::api::AnalysisApi;
use crate::error::OperationError;
use crate::{PdfFile, UploadResult};

/// Holds the selected PDF and drives the upload of it.
pub struct UploadController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<UploadResult>,
    selected: Mutex<Option<PdfFile>>,
}

impl UploadController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
            selected: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState<UploadResult> {
        self.slot.snapshot()
    }

    pub fn selected_file(&self) -> Option<PdfFile> {
        self.selected
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Accept `file` as the next upload if it is a PDF. A new selection
    /// clears the previous upload result and supersedes an upload still in
    /// flight; a rejected one changes nothing but the notice.
    pub fn select_file(&self, file: PdfFile) -> Result<(), OperationError> {
        if !file.is_pdf() {
            return Err(self.slot.reject("Invalid file", "Please select a PDF file"));
        }
        *self.selected.lock().unwrap_or_else(|p| p.into_inner()) = Some(file);
        self.slot.invalidate();
        Ok(())
    }

    /// Drop the selection and everything derived from it.
    pub fn clear_file(&self) {
        *self.selected.lock().unwrap_or_else(|p| p.into_inner()) = None;
        self.slot.reset();
    }

    /// Upload the selected file.
    pub async fn upload(&self) -> Result<UploadResult, OperationError> {
        let Some(file) = self.selected_file() else {
            return Err(self
                .slot
                .reject("No file selected", "Please select a PDF file to upload"));
        };

        let ticket = self.slot.begin(false);
        tracing::debug!(filename = %file.filename, bytes = file.data.len(), "uploading");
        let outcome = self.api.upload(&file).await;
        self.slot.complete(
            ticket,
            &outcome,
            |r| Some(Notice::success("Success!", r.message.clone())),
            "Upload failed",
        );
        outcome
    }
}
