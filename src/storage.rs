//! String key-value persistence backing the favorites and history stores.
//!
//! The disk implementation writes one JSON file per key under the platform
//! data directory. Reads of absent keys yield `None`; writes are best-effort
//! (a broken disk never takes the app down, it only stops persistence).

use std::path::PathBuf;
use tracing::warn;

pub trait Storage {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&mut self, key: &str, value: &str);
}

/// One file per key (`<key>.json`) in the platform data directory.
pub struct DiskStorage {
  dir: Option<PathBuf>,
}

impl DiskStorage {
  pub fn new() -> Self {
    let dir = crate::config::data_dir();
    if dir.is_none() {
      warn!("store: no data directory; favorites and history will not persist");
    }
    Self { dir }
  }

  fn path_for(&self, key: &str) -> Option<PathBuf> {
    self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
  }
}

impl Storage for DiskStorage {
  fn get(&self, key: &str) -> Option<String> {
    let path = self.path_for(key)?;
    std::fs::read_to_string(path).ok()
  }

  fn set(&mut self, key: &str, value: &str) {
    let Some(path) = self.path_for(key) else {
      return;
    };
    if let Some(dir) = &self.dir {
      let _ = std::fs::create_dir_all(dir);
    }
    if let Err(e) = std::fs::write(&path, value) {
      warn!(err = %e, path = %path.display(), "store: write failed");
    }
  }
}

#[cfg(test)]
pub mod mem {
  use super::Storage;
  use std::collections::HashMap;
  use std::sync::{Arc, Mutex};

  /// In-memory storage for tests. Clones share the backing map, so a store can
  /// be dropped and a fresh one loaded against the same data.
  #[derive(Clone, Default)]
  pub struct MemStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
  }

  impl Storage for MemStorage {
    fn get(&self, key: &str) -> Option<String> {
      self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
      self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
    }
  }
}
