//! Recent activity log: searches run and titles opened.
//!
//! Newest first, deduplicated, capped. A repeated search moves to the front
//! instead of appearing twice; a reopened title refreshes its stored name.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::constants;
use crate::storage::Storage;

const HISTORY_KEY: &str = "search_history";

/// One logged action. The tagged `type` field keeps the stored JSON self-describing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryEntry {
  Search { query: String, timestamp: i64 },
  Movie { id: String, title: String, timestamp: i64 },
}

impl HistoryEntry {
  pub fn timestamp(&self) -> i64 {
    match self {
      HistoryEntry::Search { timestamp, .. } | HistoryEntry::Movie { timestamp, .. } => *timestamp,
    }
  }
}

pub struct History {
  entries: Vec<HistoryEntry>,
  storage: Box<dyn Storage>,
}

impl History {
  /// Loads history from storage. Corrupt data is logged and replaced by an empty log.
  pub fn load(storage: Box<dyn Storage>) -> Self {
    let entries = match storage.get(HISTORY_KEY) {
      Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(err = %e, "history: corrupt store, starting empty");
        Vec::new()
      }),
      None => Vec::new(),
    };
    Self { entries, storage }
  }

  pub fn entries(&self) -> &[HistoryEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Logs a search. Blank queries are ignored; a repeat moves to the front.
  pub fn add_search(&mut self, query: &str) {
    self.add_search_at(query, now_millis());
  }

  /// Logs an opened title. A repeat moves to the front carrying the fresh title.
  pub fn add_movie(&mut self, id: &str, title: &str) {
    self.add_movie_at(id, title, now_millis());
  }

  pub(crate) fn add_search_at(&mut self, query: &str, timestamp: i64) {
    if query.trim().is_empty() {
      return;
    }
    self.entries.retain(|entry| !matches!(entry, HistoryEntry::Search { query: existing, .. } if existing == query));
    self.entries.insert(0, HistoryEntry::Search { query: query.to_string(), timestamp });
    self.entries.truncate(constants().history_cap);
    self.persist();
  }

  pub(crate) fn add_movie_at(&mut self, id: &str, title: &str, timestamp: i64) {
    self.entries.retain(|entry| !matches!(entry, HistoryEntry::Movie { id: existing, .. } if existing == id));
    self.entries.insert(0, HistoryEntry::Movie { id: id.to_string(), title: title.to_string(), timestamp });
    self.entries.truncate(constants().history_cap);
    self.persist();
  }

  /// Removes every entry stamped `timestamp`.
  pub fn remove(&mut self, timestamp: i64) {
    self.entries.retain(|entry| entry.timestamp() != timestamp);
    self.persist();
  }

  fn persist(&mut self) {
    if let Ok(raw) = serde_json::to_string(&self.entries) {
      self.storage.set(HISTORY_KEY, &raw);
    }
  }
}

pub fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}
