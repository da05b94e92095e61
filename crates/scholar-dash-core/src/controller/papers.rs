use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Activation, Notice, Slot, ViewState};
use crate::PaperRecord;
use crate::api::AnalysisApi;
use crate::error::OperationError;

/// Snapshot of the papers view: the listing plus per-file deletion status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PapersState {
    pub list: ViewState<Vec<PaperRecord>>,
    /// Filenames with a delete currently in flight.
    pub deleting: BTreeSet<String>,
    /// Most recent delete failure per filename.
    pub delete_errors: BTreeMap<String, OperationError>,
}

impl PapersState {
    pub fn papers(&self) -> &[PaperRecord] {
        self.list.result.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct Deletions {
    next_ticket: u64,
    in_flight: HashMap<String, u64>,
    errors: BTreeMap<String, OperationError>,
    /// Bumped on every confirmed delete.
    confirmed_seq: u64,
    /// Sequence number of the latest confirmed delete per filename.
    confirmed: HashMap<String, u64>,
}

/// The uploaded-papers listing, with deletion. Fetches once on activation.
///
/// A filename leaves the list only after the backend confirms its deletion.
/// Each filename's deletion is tracked on its own, so one failing delete
/// never disturbs another.
pub struct PapersController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<Vec<PaperRecord>>,
    deletions: Mutex<Deletions>,
    activation: Activation,
}

impl PapersController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
            deletions: Mutex::new(Deletions::default()),
            activation: Activation::default(),
        }
    }

    fn deletions(&self) -> MutexGuard<'_, Deletions> {
        self.deletions.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> PapersState {
        let list = self.slot.snapshot();
        let deletions = self.deletions();
        PapersState {
            list,
            deleting: deletions.in_flight.keys().cloned().collect(),
            delete_errors: deletions.errors.clone(),
        }
    }

    pub fn papers(&self) -> Vec<PaperRecord> {
        self.slot.snapshot().result.unwrap_or_default()
    }

    pub fn delete_error(&self, filename: &str) -> Option<OperationError> {
        self.deletions().errors.get(filename).cloned()
    }

    pub fn is_deleting(&self, filename: &str) -> bool {
        self.deletions().in_flight.contains_key(filename)
    }

    /// Call when the view becomes visible. Only the first call fetches;
    /// returns whether it did.
    pub async fn activate(&self) -> bool {
        if !self.activation.first() {
            return false;
        }
        if let Err(err) = self.refresh().await {
            tracing::debug!(error = %err, "initial paper listing failed");
        }
        true
    }

    /// Reload the listing. On failure the previous listing stays.
    ///
    /// Files whose deletion was confirmed while this listing was in flight
    /// are left out of it.
    pub async fn refresh(&self) -> Result<Vec<PaperRecord>, OperationError> {
        let (ticket, seq_at_dispatch) = {
            let d = self.deletions();
            (self.slot.begin(false), d.confirmed_seq)
        };
        let outcome = self.api.list_papers().await;

        // Filter and apply under one lock so a delete cannot land in between.
        let d = self.deletions();
        let outcome = outcome.map(|mut list| {
            list.retain(|p| {
                d.confirmed
                    .get(&p.filename)
                    .is_none_or(|&seq| seq <= seq_at_dispatch)
            });
            list
        });
        self.slot
            .complete(ticket, &outcome, |_| None, "Failed to load papers");
        drop(d);
        outcome
    }

    /// Delete `filename` on the backend, then drop it from the listing.
    pub async fn delete(&self, filename: &str) -> Result<String, OperationError> {
        if filename.trim().is_empty() {
            let err = OperationError::validation("No paper selected");
            self.slot
                .update(|s| s.notice = Some(Notice::error("Delete failed", err.message())));
            return Err(err);
        }

        let ticket = {
            let mut d = self.deletions();
            d.next_ticket += 1;
            let ticket = d.next_ticket;
            d.in_flight.insert(filename.to_string(), ticket);
            ticket
        };

        let outcome = self.api.delete_paper(filename).await;

        let mut d = self.deletions();
        if d.in_flight.get(filename) != Some(&ticket) {
            tracing::debug!(%filename, "discarding superseded delete result");
            return outcome;
        }
        d.in_flight.remove(filename);

        match &outcome {
            Ok(_) => {
                d.errors.remove(filename);
                d.confirmed_seq += 1;
                let seq = d.confirmed_seq;
                d.confirmed.insert(filename.to_string(), seq);
                self.slot.update(|s| {
                    if let Some(list) = s.result.as_mut() {
                        list.retain(|p| p.filename != filename);
                    }
                    s.notice = Some(Notice::success(
                        "Deleted",
                        format!("{} has been removed", filename),
                    ));
                });
            }
            Err(err) => {
                tracing::warn!(%filename, error = %err, "delete failed");
                d.errors.insert(filename.to_string(), err.clone());
                self.slot
                    .update(|s| s.notice = Some(Notice::error("Delete failed", err.message())));
            }
        }
        drop(d);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::Operation;
    use crate::controller::Phase;
    use crate::mock::{MockApi, server_error};

    fn records(names: &[&str]) -> Vec<PaperRecord> {
        names
            .iter()
            .map(|n| PaperRecord {
                filename: n.to_string(),
            })
            .collect()
    }

    fn names(ctl: &PapersController) -> Vec<String> {
        ctl.papers().into_iter().map(|p| p.filename).collect()
    }

    async fn loaded(api: &Arc<MockApi>, list: &[&str]) -> Arc<PapersController> {
        api.papers.push(Ok(records(list)));
        let ctl = Arc::new(PapersController::new(api.clone()));
        assert!(ctl.activate().await);
        ctl
    }

    #[tokio::test]
    async fn activation_loads_listing_once() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf", "b.pdf"]).await;

        assert!(!ctl.activate().await);
        assert_eq!(api.papers.calls(), 1);
        assert_eq!(names(&ctl), vec!["a.pdf", "b.pdf"]);
        assert_eq!(ctl.state().list.phase, Phase::Success);
    }

    #[tokio::test]
    async fn delete_removes_only_after_confirmation() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf", "b.pdf"]).await;
        let gate = api.delete.push_gated(Ok("Deleted a.pdf".into()));

        let task = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.delete("a.pdf").await })
        };
        api.delete.wait_for_calls(1).await;
        assert!(ctl.is_deleting("a.pdf"));
        assert_eq!(names(&ctl), vec!["a.pdf", "b.pdf"]);

        gate.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert!(!ctl.is_deleting("a.pdf"));
        assert_eq!(names(&ctl), vec!["b.pdf"]);
        let notice = ctl.state().list.notice.unwrap();
        assert_eq!(notice.title, "Deleted");
        assert_eq!(notice.description, "a.pdf has been removed");
    }

    #[tokio::test]
    async fn failed_delete_keeps_file_and_scopes_error() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf", "b.pdf", "c.pdf"]).await;
        let fail_gate = api
            .delete
            .push_gated(Err(server_error(Operation::DeletePaper, "Permission denied")));
        let ok_gate = api.delete.push_gated(Ok("Deleted b.pdf".into()));

        let failing = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.delete("a.pdf").await })
        };
        api.delete.wait_for_calls(1).await;
        let succeeding = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.delete("b.pdf").await })
        };
        api.delete.wait_for_calls(2).await;

        let state = ctl.state();
        assert_eq!(
            state.deleting.iter().cloned().collect::<Vec<_>>(),
            vec!["a.pdf", "b.pdf"]
        );

        fail_gate.send(()).unwrap();
        failing.await.unwrap().unwrap_err();
        ok_gate.send(()).unwrap();
        succeeding.await.unwrap().unwrap();

        assert_eq!(names(&ctl), vec!["a.pdf", "c.pdf"]);
        assert_eq!(
            ctl.delete_error("a.pdf").unwrap().message(),
            "Permission denied"
        );
        assert!(ctl.delete_error("b.pdf").is_none());
        assert!(ctl.state().deleting.is_empty());
    }

    #[tokio::test]
    async fn retry_after_failure_clears_error() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf"]).await;
        api.delete
            .push(Err(server_error(Operation::DeletePaper, "Delete failed")));
        api.delete.push(Ok("Deleted".into()));

        ctl.delete("a.pdf").await.unwrap_err();
        assert!(ctl.delete_error("a.pdf").is_some());
        assert_eq!(ctl.state().list.notice.unwrap().title, "Delete failed");

        ctl.delete("a.pdf").await.unwrap();
        assert!(ctl.delete_error("a.pdf").is_none());
        assert!(ctl.state().papers().is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_listing() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf"]).await;
        api.papers
            .push(Err(server_error(Operation::ListPapers, "Failed to fetch papers")));

        ctl.refresh().await.unwrap_err();

        let state = ctl.state();
        assert_eq!(state.list.phase, Phase::Failed);
        assert_eq!(state.papers(), records(&["a.pdf"]).as_slice());
        assert_eq!(state.list.notice.unwrap().title, "Failed to load papers");
    }

    #[tokio::test]
    async fn blank_filename_rejected_without_touching_listing() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf"]).await;

        let err = ctl.delete("  ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(api.delete.calls(), 0);
        assert_eq!(names(&ctl), vec!["a.pdf"]);

        let state = ctl.state();
        assert_eq!(state.list.phase, Phase::Success);
        assert!(state.list.error.is_none());
        assert!(state.delete_errors.is_empty());
        assert_eq!(state.list.notice.unwrap().description, "No paper selected");
    }

    #[tokio::test]
    async fn refresh_in_flight_does_not_restore_deleted_paper() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf", "b.pdf"]).await;
        let gate = api.papers.push_gated(Ok(records(&["a.pdf", "b.pdf"])));
        api.delete.push(Ok("Deleted a.pdf".into()));

        let refresh = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.refresh().await })
        };
        api.papers.wait_for_calls(2).await;
        ctl.delete("a.pdf").await.unwrap();
        assert_eq!(names(&ctl), vec!["b.pdf"]);

        gate.send(()).unwrap();
        let listed = refresh.await.unwrap().unwrap();

        assert_eq!(listed, records(&["b.pdf"]));
        assert_eq!(names(&ctl), vec!["b.pdf"]);
        assert_eq!(ctl.state().list.phase, Phase::Success);
    }

    #[tokio::test]
    async fn later_refresh_shows_reuploaded_paper() {
        let api = Arc::new(MockApi::default());
        let ctl = loaded(&api, &["a.pdf"]).await;
        api.delete.push(Ok("Deleted a.pdf".into()));
        api.papers.push(Ok(records(&["a.pdf"])));

        ctl.delete("a.pdf").await.unwrap();
        assert!(ctl.papers().is_empty());

        ctl.refresh().await.unwrap();
        assert_eq!(names(&ctl), vec!["a.pdf"]);
    }
}
