// crates/waybill-engine/src/recorder.rs
//
// The change-log recorder: appends immutable audit entries to a leg's
// change log and serves read-only views of the log and the status history.
//
// The repository's own write path appends entries in memory (via
// `ChangeLogEntry::new`) so a single persist covers both the mutation and
// its audit entry; this service exists for callers that record an entry as
// a standalone operation (e.g. annotations from outside the engine).

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use waybill_core::changelog::{ChangeLogEntry, FieldDiff, StatusHistoryEntry};
use waybill_core::error::TrackingError;
use waybill_core::traits::LegStore;

/// Recorder over the `legs` collection.
pub struct ChangeLogRecorder<S> {
    store: Arc<S>,
}

impl<S: LegStore> ChangeLogRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append an audit entry to a leg's change log.
    ///
    /// Fails with `LegNotFound` if the leg is absent; storage failures
    /// propagate to the caller.
    pub async fn record(
        &self,
        leg_id: &Uuid,
        actor: &str,
        action: &str,
        field_diffs: BTreeMap<String, FieldDiff>,
    ) -> Result<ChangeLogEntry, TrackingError> {
        let mut leg = self
            .store
            .get_leg(leg_id)
            .await?
            .ok_or(TrackingError::LegNotFound(*leg_id))?;

        let entry = ChangeLogEntry::new(actor, action, field_diffs);
        leg.change_log.push(entry.clone());
        self.store.save_leg(&leg).await?;
        Ok(entry)
    }

    /// A leg's full change log, oldest first.
    pub async fn change_log(&self, leg_id: &Uuid) -> Result<Vec<ChangeLogEntry>, TrackingError> {
        let leg = self
            .store
            .get_leg(leg_id)
            .await?
            .ok_or(TrackingError::LegNotFound(*leg_id))?;
        Ok(leg.change_log)
    }

    /// A leg's status-transition history, oldest first.
    pub async fn status_history(
        &self,
        leg_id: &Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, TrackingError> {
        let leg = self
            .store
            .get_leg(leg_id)
            .await?
            .ok_or(TrackingError::LegNotFound(*leg_id))?;
        Ok(leg.status_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_core::leg::Leg;
    use waybill_store::MemoryStore;

    #[tokio::test]
    async fn record_appends_in_order() {
        let store = Arc::new(MemoryStore::new());
        let recorder = ChangeLogRecorder::new(store.clone());

        let leg = Leg::new(Uuid::now_v7());
        store.save_leg(&leg).await.unwrap();

        recorder
            .record(&leg.id, "ops@example", "annotate", BTreeMap::new())
            .await
            .unwrap();
        let mut diffs = BTreeMap::new();
        diffs.insert(
            "carrier".to_string(),
            FieldDiff {
                old: None,
                new: Some("Acme Air".to_string()),
            },
        );
        recorder
            .record(&leg.id, "ops@example", "correction", diffs)
            .await
            .unwrap();

        let log = recorder.change_log(&leg.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, "annotate");
        assert_eq!(log[1].action, "correction");
        assert_eq!(log[1].field_diffs["carrier"].new.as_deref(), Some("Acme Air"));
    }

    #[tokio::test]
    async fn missing_leg_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let recorder = ChangeLogRecorder::new(store);

        let err = recorder
            .record(&Uuid::now_v7(), "ops", "annotate", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::LegNotFound(_)));
    }

    #[tokio::test]
    async fn status_history_reads_back() {
        let store = Arc::new(MemoryStore::new());
        let recorder = ChangeLogRecorder::new(store.clone());

        let leg = Leg::new(Uuid::now_v7());
        store.save_leg(&leg).await.unwrap();

        let history = recorder.status_history(&leg.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, leg.status);
    }
}
