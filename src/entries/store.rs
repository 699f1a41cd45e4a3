//! Mirrors the entry log into the local database.
//!
//! The whole collection is stored as one JSON list of flat records under a
//! single key, newest first. The in-memory collection stays the source of
//! truth; this store is read once at startup and rewritten after every change.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;

use crate::{db::Database, models::Entry};

use super::collection::EntryCollection;

pub const ENTRIES_KEY: &str = "stress-test-entries";

#[derive(Clone)]
pub struct EntryStore {
    db: Database,
    key: String,
}

impl EntryStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            key: ENTRIES_KEY.to_string(),
        }
    }

    /// Never fails: unreadable storage or an unparsable blob gives an empty
    /// collection, and individual bad records are skipped.
    pub async fn load(&self) -> EntryCollection {
        let blob = match self.db.get_value(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return EntryCollection::new(),
            Err(err) => {
                warn!("Failed to read saved entries, starting empty: {err:#}");
                return EntryCollection::new();
            }
        };

        let collection = decode_entries(&blob);
        info!("Loaded {} saved entries", collection.len());
        collection
    }

    pub async fn save(&self, collection: &EntryCollection) -> Result<()> {
        let blob = encode_entries(collection)?;
        self.db
            .put_value(&self.key, blob)
            .await
            .context("failed to save entries")
    }

    pub async fn clear(&self) -> Result<()> {
        self.db
            .delete_value(&self.key)
            .await
            .context("failed to clear saved entries")?;
        Ok(())
    }
}

pub fn encode_entries(collection: &EntryCollection) -> Result<String> {
    serde_json::to_string(collection).context("failed to encode entries")
}

/// Same encoding as the stored blob, indented for people.
pub fn export_json(collection: &EntryCollection) -> Result<String> {
    serde_json::to_string_pretty(collection).context("failed to encode entries")
}

pub fn decode_entries(blob: &str) -> EntryCollection {
    let records = match serde_json::from_str::<Vec<Value>>(blob) {
        Ok(records) => records,
        Err(err) => {
            warn!("Saved entries are not a list of records, starting empty: {err}");
            return EntryCollection::new();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let entry = match serde_json::from_value::<Entry>(record) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping saved record #{index}: {err}");
                continue;
            }
        };
        if let Some(problem) = record_problem(&entry) {
            warn!("Skipping saved entry {}: {problem}", entry.id);
            continue;
        }
        if !seen.insert(entry.id.clone()) {
            warn!("Skipping duplicate saved entry {}", entry.id);
            continue;
        }
        entries.push(entry);
    }

    EntryCollection::from_entries(entries)
}

/// Structural checks only. The creation tolerance is a policy that may have
/// changed since the entry was recorded, so it is not re-applied here.
fn record_problem(entry: &Entry) -> Option<&'static str> {
    let hours = [entry.total_hours, entry.good_hours, entry.bad_hours];
    if hours.iter().chain([&entry.efficiency]).any(|v| !v.is_finite()) {
        return Some("non-finite value");
    }
    if entry.total_hours <= 0.0 {
        return Some("total hours must be positive");
    }
    if entry.good_hours < 0.0 || entry.bad_hours < 0.0 {
        return Some("negative hours");
    }
    if !(0.0..=100.0).contains(&entry.efficiency) {
        return Some("efficiency outside 0-100");
    }
    None
}
