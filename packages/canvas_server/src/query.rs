//! Read-only access to canvas state for pull requests.
//!
//! Queries travel through the hub's command queue like every other
//! operation, so each answer is a snapshot taken between two mutations and
//! can never observe a half-applied placement. The hub copies the state and
//! moves on; serialization happens in the caller's task.

use anyhow::Result;
use canvas_core::{Backup, MapSummary};

use crate::hub::{HubCommand, HubHandle};

#[derive(Clone)]
pub struct QueryService {
    hub: HubHandle,
}

impl QueryService {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Current grid, painted-cell count, and online count.
    pub async fn map_summary(&self) -> Result<MapSummary> {
        self.hub
            .request(|respond_to| HubCommand::MapSummary { respond_to })
            .await
    }

    /// Current grid plus the retained placement history, stamped with the
    /// export time.
    pub async fn backup(&self) -> Result<Backup> {
        self.hub
            .request(|respond_to| HubCommand::Backup { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::BroadcastHub;
    use crate::metrics::ServerMetrics;
    use canvas_core::{PlacePixel, SessionId};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_empty_summary() {
        let hub = BroadcastHub::new(Arc::new(ServerMetrics::new())).spawn(16);
        let query = QueryService::new(hub);

        let summary = query.map_summary().await.unwrap();
        assert!(summary.pixels.is_empty());
        assert_eq!(summary.total_pixels, 0);
        assert_eq!(summary.online, 0);
    }

    #[tokio::test]
    async fn test_summary_and_backup_reflect_placements() {
        let hub = BroadcastHub::new(Arc::new(ServerMetrics::new())).spawn(16);
        let query = QueryService::new(hub.clone());

        let session = SessionId::new();
        let (tx, _rx) = mpsc::channel(16);
        hub.connect(session, tx).await.unwrap();
        hub.place(session, PlacePixel::new(1, 1, "red", "A")).await.unwrap();
        hub.place(session, PlacePixel::new(1, 1, "blue", "B")).await.unwrap();
        hub.place(session, PlacePixel::new(2, 2, "red", "A")).await.unwrap();

        let summary = query.map_summary().await.unwrap();
        assert_eq!(summary.total_pixels, 2);
        assert_eq!(summary.online, 1);

        let before = chrono::Utc::now().timestamp_millis();
        let backup = query.backup().await.unwrap();
        assert_eq!(backup.history.len(), 3);
        assert_eq!(backup.pixels, summary.pixels);
        assert!(backup.timestamp >= before);
    }

    #[tokio::test]
    async fn test_summary_fails_when_hub_is_gone() {
        let (sender, receiver) = mpsc::channel::<HubCommand>(1);
        drop(receiver);
        let query = QueryService::new(HubHandle::from_sender(sender));

        assert!(query.map_summary().await.is_err());
        assert!(query.backup().await.is_err());
    }
}
