//! Persisted completion sets: which checklist items a viewer has marked done.
//!
//! Each namespace is one JSON file holding an array of item ids. Every
//! mutation writes the file straight away; there is no cross-process locking,
//! the last writer wins.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::util::is_safe_key;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("invalid checklist namespace '{0}'")]
  InvalidNamespace(String),
  #[error("checklist item id must not be empty")]
  EmptyItem,
  #[error("checklist storage failed: {0}")]
  Io(#[from] std::io::Error),
  #[error("checklist encoding failed: {0}")]
  Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CompletionSet {
  pub namespace: String,
  pub done: BTreeSet<String>,
}

impl CompletionSet {
  pub fn empty(namespace: &str) -> Self {
    Self { namespace: namespace.to_string(), done: BTreeSet::new() }
  }

  pub fn contains(&self, id: &str) -> bool {
    self.done.contains(id)
  }

  pub fn len(&self) -> usize {
    self.done.len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.done.is_empty()
  }
}

pub struct CompletionStore {
  dir: PathBuf,
  // serializes load-modify-save within this process
  write_lock: Mutex<()>,
}

impl CompletionStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into(), write_lock: Mutex::new(()) }
  }

  fn path_for(&self, namespace: &str) -> Result<PathBuf, StoreError> {
    if !is_safe_key(namespace) {
      return Err(StoreError::InvalidNamespace(namespace.to_string()));
    }
    Ok(self.dir.join(format!("{namespace}.json")))
  }

  /// Load a namespace. A missing file is an empty set; an unreadable one is
  /// logged and treated as empty so the next write replaces it.
  #[instrument(level = "debug", skip(self))]
  pub async fn load(&self, namespace: &str) -> Result<CompletionSet, StoreError> {
    let path = self.path_for(namespace)?;
    let raw = match tokio::fs::read_to_string(&path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CompletionSet::empty(namespace)),
      Err(e) => return Err(e.into()),
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
      Ok(ids) => Ok(CompletionSet { namespace: namespace.to_string(), done: ids.into_iter().collect() }),
      Err(e) => {
        warn!(target: "checklist", %namespace, path = %path.display(), error = %e, "Unreadable checklist file; starting empty");
        Ok(CompletionSet::empty(namespace))
      }
    }
  }

  async fn save(&self, set: &CompletionSet) -> Result<(), StoreError> {
    let path = self.path_for(&set.namespace)?;
    tokio::fs::create_dir_all(&self.dir).await?;
    let ids: Vec<&String> = set.done.iter().collect();
    let body = serde_json::to_vec(&ids)?;
    // write-then-rename so a crash never leaves half a file behind
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, &path).await?;
    debug!(target: "checklist", namespace = %set.namespace, items = set.len(), "Checklist saved");
    Ok(())
  }

  async fn mutate<F>(&self, namespace: &str, f: F) -> Result<CompletionSet, StoreError>
  where
    F: FnOnce(&mut BTreeSet<String>),
  {
    let _guard = self.write_lock.lock().await;
    let mut set = self.load(namespace).await?;
    f(&mut set.done);
    self.save(&set).await?;
    Ok(set)
  }

  /// Mark `id` done (`true`) or not done (`false`).
  #[instrument(level = "info", skip(self))]
  pub async fn mark(&self, namespace: &str, id: &str, done: bool) -> Result<CompletionSet, StoreError> {
    if id.trim().is_empty() {
      return Err(StoreError::EmptyItem);
    }
    self
      .mutate(namespace, |ids| {
        if done {
          ids.insert(id.to_string());
        } else {
          ids.remove(id);
        }
      })
      .await
  }

  #[instrument(level = "info", skip(self))]
  pub async fn toggle(&self, namespace: &str, id: &str) -> Result<CompletionSet, StoreError> {
    if id.trim().is_empty() {
      return Err(StoreError::EmptyItem);
    }
    self
      .mutate(namespace, |ids| {
        if !ids.remove(id) {
          ids.insert(id.to_string());
        }
      })
      .await
  }

  #[instrument(level = "info", skip(self))]
  pub async fn clear(&self, namespace: &str) -> Result<CompletionSet, StoreError> {
    self.mutate(namespace, BTreeSet::clear).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn store() -> (TempDir, CompletionStore) {
    let dir = TempDir::new().unwrap();
    let store = CompletionStore::new(dir.path());
    (dir, store)
  }

  #[tokio::test]
  async fn missing_namespace_loads_empty() {
    let (_dir, store) = store();
    let set = store.load("onboarding").await.unwrap();
    assert!(set.is_empty());
    assert_eq!(set.namespace, "onboarding");
  }

  #[tokio::test]
  async fn mark_persists_immediately() {
    let (dir, store) = store();
    store.mark("onboarding", "sign-mou", true).await.unwrap();
    store.mark("onboarding", "kickoff-call", true).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("onboarding.json")).unwrap();
    let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(ids, vec!["kickoff-call".to_string(), "sign-mou".to_string()]);

    let reopened = CompletionStore::new(dir.path());
    let set = reopened.load("onboarding").await.unwrap();
    assert!(set.contains("sign-mou"));
    assert_eq!(set.len(), 2);
  }

  #[tokio::test]
  async fn mark_is_idempotent_and_unmark_removes() {
    let (_dir, store) = store();
    store.mark("ns", "a", true).await.unwrap();
    let set = store.mark("ns", "a", true).await.unwrap();
    assert_eq!(set.len(), 1);
    let set = store.mark("ns", "a", false).await.unwrap();
    assert!(set.is_empty());
  }

  #[tokio::test]
  async fn toggle_flips_membership() {
    let (_dir, store) = store();
    assert!(store.toggle("ns", "a").await.unwrap().contains("a"));
    assert!(!store.toggle("ns", "a").await.unwrap().contains("a"));
  }

  #[tokio::test]
  async fn clear_empties_the_namespace_only() {
    let (_dir, store) = store();
    store.mark("one", "a", true).await.unwrap();
    store.mark("two", "b", true).await.unwrap();
    assert!(store.clear("one").await.unwrap().is_empty());
    assert!(store.load("two").await.unwrap().contains("b"));
  }

  #[tokio::test]
  async fn rejects_unsafe_namespaces_and_empty_ids() {
    let (_dir, store) = store();
    assert!(matches!(store.load("../escape").await, Err(StoreError::InvalidNamespace(_))));
    assert!(matches!(store.mark("ns", "  ", true).await, Err(StoreError::EmptyItem)));
  }

  #[tokio::test]
  async fn corrupt_file_is_treated_as_empty_and_replaced() {
    let (dir, store) = store();
    std::fs::write(dir.path().join("ns.json"), "{not json").unwrap();
    assert!(store.load("ns").await.unwrap().is_empty());
    let set = store.mark("ns", "a", true).await.unwrap();
    assert_eq!(set.len(), 1);
    let raw = std::fs::read_to_string(dir.path().join("ns.json")).unwrap();
    assert_eq!(raw, r#"["a"]"#);
  }
}
