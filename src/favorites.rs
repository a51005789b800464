//! Starred titles, persisted as a JSON array of search rows.

use tracing::debug;

use crate::omdb::SearchItem;
use crate::storage::Storage;

const FAVORITES_KEY: &str = "favorites";

/// The favorites collection. Order is insertion order; toggling an existing
/// favorite removes it without disturbing the rest.
pub struct Favorites {
  items: Vec<SearchItem>,
  storage: Box<dyn Storage>,
}

impl Favorites {
  /// Loads favorites from storage. Missing or corrupt data yields an empty set.
  pub fn load(storage: Box<dyn Storage>) -> Self {
    let items = storage.get(FAVORITES_KEY).and_then(|raw| serde_json::from_str(&raw).ok()).unwrap_or_default();
    Self { items, storage }
  }

  pub fn items(&self) -> &[SearchItem] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn is_favorite(&self, id: &str) -> bool {
    self.items.iter().any(|item| item.id == id)
  }

  /// Adds `item` if absent, removes it if present. Persists either way.
  pub fn toggle(&mut self, item: &SearchItem) {
    if self.is_favorite(&item.id) {
      self.items.retain(|existing| existing.id != item.id);
      debug!(id = %item.id, "favorites: removed");
    } else {
      self.items.push(item.clone());
      debug!(id = %item.id, "favorites: added");
    }
    self.persist();
  }

  fn persist(&mut self) {
    if let Ok(raw) = serde_json::to_string(&self.items) {
      self.storage.set(FAVORITES_KEY, &raw);
    }
  }
}
