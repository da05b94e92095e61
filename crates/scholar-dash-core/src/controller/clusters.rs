use std::sync::Arc;

use super::{Activation, Slot, ViewState};
use crate::ClusterSet;
use crate::api::AnalysisApi;
use crate::error::OperationError;

/// Topic clusters across all uploaded papers. Fetches once on activation.
pub struct ClustersController {
    api: Arc<dyn AnalysisApi>,
    slot: Slot<ClusterSet>,
    activation: Activation,
}

impl ClustersController {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            slot: Slot::default(),
            activation: Activation::default(),
        }
    }

    pub fn state(&self) -> ViewState<ClusterSet> {
        self.slot.snapshot()
    }

    /// Call when the view becomes visible. Only the first call fetches;
    /// returns whether it did.
    pub async fn activate(&self) -> bool {
        if !self.activation.first() {
            return false;
        }
        if let Err(err) = self.refresh().await {
            tracing::debug!(error = %err, "initial clustering failed");
        }
        true
    }

    /// Re-run clustering. Earlier clusters stay visible while this is in flight.
    pub async fn refresh(&self) -> Result<ClusterSet, OperationError> {
        let ticket = self.slot.begin(false);
        let outcome = self.api.cluster().await;
        self.slot
            .complete(ticket, &outcome, |_| None, "Clustering failed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::Operation;
    use crate::controller::Phase;
    use crate::mock::{MockApi, server_error};

    fn clusters() -> ClusterSet {
        ClusterSet {
            groups: vec![
                vec!["neural".into(), "network".into()],
                vec!["climate".into(), "network".into()],
            ],
        }
    }

    #[tokio::test]
    async fn activate_fetches_exactly_once() {
        let api = Arc::new(MockApi::default());
        api.cluster.push(Ok(clusters()));
        let ctl = ClustersController::new(api.clone());

        assert!(ctl.activate().await);
        assert!(!ctl.activate().await);
        assert_eq!(api.cluster.calls(), 1);
        assert_eq!(ctl.state().result.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_clusters() {
        let api = Arc::new(MockApi::default());
        api.cluster.push(Ok(clusters()));
        api.cluster
            .push(Err(server_error(Operation::Cluster, "Not enough documents")));
        let ctl = ClustersController::new(api);

        ctl.activate().await;
        ctl.refresh().await.unwrap_err();

        let state = ctl.state();
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.result.unwrap(), clusters());
        assert_eq!(state.notice.unwrap().title, "Clustering failed");
    }

    #[tokio::test]
    async fn activation_failure_is_recorded() {
        let api = Arc::new(MockApi::default());
        api.cluster
            .push(Err(server_error(Operation::Cluster, "Clustering failed")));
        let ctl = ClustersController::new(api);

        assert!(ctl.activate().await);
        let state = ctl.state();
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.error_message(), Some("Clustering failed"));
    }
}
