use std::path::PathBuf;

use log::{info, warn};

use crate::{
    db::Database,
    metrics::{self, AggregateSnapshot, CompositionView, DashboardSnapshot, TrendView},
    models::Entry,
};

use super::{
    collection::EntryCollection,
    store::EntryStore,
    validator::{EntryValidator, ValidationError, ValidationPolicy},
};

/// State of one running dashboard: the entry log, the validator that guards
/// it, and an optional store that mirrors it to disk.
///
/// Saving is best effort. A failed save is logged and the in-memory change
/// stands.
pub struct DashboardSession {
    entries: EntryCollection,
    validator: EntryValidator,
    store: Option<EntryStore>,
}

impl DashboardSession {
    pub async fn open(store: EntryStore, policy: ValidationPolicy) -> Self {
        let entries = store.load().await;
        Self {
            entries,
            validator: EntryValidator::new(policy),
            store: Some(store),
        }
    }

    /// Opens the database at `db_path` and loads its entries. A database that
    /// cannot be opened leaves the session in memory only.
    pub async fn open_at(db_path: PathBuf, policy: ValidationPolicy) -> Self {
        match Database::new(db_path) {
            Ok(db) => Self::open(EntryStore::new(db), policy).await,
            Err(err) => {
                warn!("Database unavailable, entries will not be saved: {err:#}");
                Self::in_memory(policy)
            }
        }
    }

    pub fn in_memory(policy: ValidationPolicy) -> Self {
        Self::from_parts(EntryCollection::new(), EntryValidator::new(policy), None)
    }

    pub fn from_parts(
        entries: EntryCollection,
        validator: EntryValidator,
        store: Option<EntryStore>,
    ) -> Self {
        Self {
            entries,
            validator,
            store,
        }
    }

    /// Validates the raw fields and, on success, puts the new entry at the
    /// front of the log. On failure the log is left as it was.
    pub async fn add_entry(
        &mut self,
        raw_total: &str,
        raw_good: &str,
        raw_bad: &str,
    ) -> Result<Entry, ValidationError> {
        let entry = self
            .validator
            .validate_and_build(raw_total, raw_good, raw_bad)?;
        self.entries.prepend(entry.clone());
        info!(
            "Added entry {} ({}h, {:.2}% efficient)",
            entry.id, entry.total_hours, entry.efficiency
        );
        self.persist().await;
        Ok(entry)
    }

    /// Unknown ids are ignored.
    pub async fn remove_entry(&mut self, id: &str) -> Option<Entry> {
        let removed = self.entries.remove_by_id(id);
        if removed.is_some() {
            info!("Removed entry {id}");
            self.persist().await;
        }
        removed
    }

    pub async fn clear(&mut self) -> usize {
        let removed = self.entries.clear();
        info!("Cleared {removed} entries");
        if let Some(store) = &self.store {
            if let Err(err) = store.clear().await {
                warn!("Entries cleared in memory but not on disk: {err:#}");
            }
        }
        removed
    }

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.validator.policy()
    }

    pub fn summary(&self) -> AggregateSnapshot {
        metrics::summarize(self.entries.as_slice())
    }

    pub fn composition(&self) -> CompositionView {
        metrics::composition(self.entries.as_slice())
    }

    pub fn trend(&self) -> TrendView {
        metrics::trend(self.entries.as_slice())
    }

    pub fn dashboard(&self) -> DashboardSnapshot {
        metrics::dashboard(self.entries.as_slice())
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.save(&self.entries).await {
            warn!("Entry log changed in memory but was not saved: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entries::clock::fixed::{SequentialIds, SteppingClock},
        entries::ErrorKind,
    };
    use tempfile::tempdir;

    fn fixed_validator() -> EntryValidator {
        EntryValidator::with_capabilities(
            ValidationPolicy::default(),
            Box::new(SteppingClock::new(1_000, 1_000)),
            Box::new(SequentialIds::default()),
        )
    }

    fn session(store: Option<EntryStore>) -> DashboardSession {
        DashboardSession::from_parts(EntryCollection::new(), fixed_validator(), store)
    }

    fn ids(session: &DashboardSession) -> Vec<String> {
        session.entries().iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_add_prepends_and_updates_views() {
        let mut session = session(None);
        session.add_entry("24", "22", "2").await.unwrap();
        session.add_entry("24", "19", "5").await.unwrap();

        assert_eq!(ids(&session), vec!["entry-2", "entry-1"]);

        let summary = session.summary();
        assert!((summary.total_recording - 48.0).abs() < 1e-9);
        assert!((summary.total_good - 41.0).abs() < 1e-9);
        assert!((summary.total_bad - 7.0).abs() < 1e-9);
        assert!((summary.avg_efficiency - 85.42).abs() < 1e-9);

        let trend = session.trend();
        assert_eq!(trend[0].timestamp, 1_000);
        assert_eq!(trend[1].timestamp, 2_000);
    }

    #[tokio::test]
    async fn test_rejected_input_leaves_log_untouched() {
        let mut session = session(None);
        session.add_entry("10", "7", "3").await.unwrap();
        let before = session.entries().clone();

        for (total, good, bad) in [("x", "1", "1"), ("10", "5", "1"), ("0", "0", "0")] {
            assert!(session.add_entry(total, good, bad).await.is_err());
        }
        assert_eq!(session.entries(), &before);

        // Still usable after failures.
        let err = session.add_entry("10", "7", "2.5").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistent);
        session.add_entry("10", "7", "2.995").await.unwrap();
        assert_eq!(session.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let mut session = session(None);
        for _ in 0..3 {
            session.add_entry("1", "1", "0").await.unwrap();
        }

        assert!(session.remove_entry("entry-2").await.is_some());
        assert_eq!(ids(&session), vec!["entry-3", "entry-1"]);
        assert!(session.remove_entry("entry-2").await.is_none());
        assert_eq!(ids(&session), vec!["entry-3", "entry-1"]);

        assert_eq!(session.clear().await, 2);
        assert_eq!(session.summary(), AggregateSnapshot::default());
    }

    #[tokio::test]
    async fn test_changes_are_mirrored_to_store() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(Database::new(dir.path().join("log.sqlite3")).unwrap());

        let mut first = session(Some(store.clone()));
        first.add_entry("24", "22", "2").await.unwrap();
        first.add_entry("24", "19", "5").await.unwrap();
        first.remove_entry("entry-1").await;

        let reopened = DashboardSession::open(store.clone(), ValidationPolicy::default()).await;
        assert_eq!(ids(&reopened), vec!["entry-2"]);

        first.clear().await;
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_change() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("log.sqlite3")).unwrap();
        db.execute(|conn| {
            conn.execute_batch("DROP TABLE storage;")?;
            Ok(())
        })
        .await
        .unwrap();

        let mut session = session(Some(EntryStore::new(db)));
        let entry = session.add_entry("10", "7", "3").await.unwrap();

        assert_eq!(session.entries().get(&entry.id), Some(&entry));
    }

    #[tokio::test]
    async fn test_unreadable_database_falls_back_to_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.sqlite3");
        std::fs::write(&path, "this is not a sqlite file\n".repeat(200)).unwrap();

        let mut session = DashboardSession::open_at(path, ValidationPolicy::default()).await;
        assert!(session.entries().is_empty());
        assert!(session.store.is_none());

        session.add_entry("24", "22", "2").await.unwrap();
        assert_eq!(session.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_open_at_loads_saved_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.sqlite3");
        let mut first = DashboardSession::open_at(path.clone(), ValidationPolicy::default()).await;
        first.add_entry("10", "9", "1").await.unwrap();
        drop(first);

        let reopened = DashboardSession::open_at(path, ValidationPolicy::default()).await;
        assert_eq!(reopened.entries().len(), 1);
        assert!(reopened.store.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_session_starts_empty() {
        let session = DashboardSession::in_memory(ValidationPolicy::default());
        assert!(session.entries().is_empty());
        assert_eq!(session.composition()[0].value, 0.0);
        assert!(session.dashboard().trend.is_empty());
    }
}
