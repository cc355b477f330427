//! Snippet lookup.
//!
//! The server only reads snippets. [`SnippetStore`] is the seam where a real
//! codebottle API client plugs in; [`MemoryStore`] serves a JSON snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cb2m_core::{Revision, Snippet};
use serde::Deserialize;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use crate::error::{ServerError, ServerResult};

/// Read-only source of snippets and revisions.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Wait until the store has finished its initial load.
    async fn ready(&self);

    /// Find a snippet by id.
    async fn lookup_snippet(&self, id: &str) -> Option<Snippet>;

    /// Find a revision of `snippet` by number.
    async fn lookup_revision(&self, snippet: &Snippet, id: u32) -> Option<Revision>;
}

/// One snapshot record: a snippet and all its revisions.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEntry {
    #[serde(flatten)]
    pub snippet: Snippet,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug)]
struct StoredSnippet {
    snippet: Snippet,
    revisions: HashMap<u32, Revision>,
}

/// In-memory snippet store.
///
/// Starts not ready; [`MemoryStore::mark_ready`] or a finished snapshot load
/// releases everyone blocked in [`SnippetStore::ready`].
#[derive(Debug)]
pub struct MemoryStore {
    snippets: RwLock<HashMap<String, StoredSnippet>>,
    ready: watch::Sender<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store that is not ready yet.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            snippets: RwLock::new(HashMap::new()),
            ready,
        }
    }

    /// Create a ready store holding `entries`.
    pub async fn with_entries(entries: impl IntoIterator<Item = SnapshotEntry>) -> Self {
        let store = Self::new();
        store.extend(entries).await;
        store.mark_ready();
        store
    }

    /// Add or replace a snippet and its revisions.
    pub async fn insert(&self, snippet: Snippet, revisions: Vec<Revision>) {
        self.extend([SnapshotEntry { snippet, revisions }]).await;
    }

    async fn extend(&self, entries: impl IntoIterator<Item = SnapshotEntry>) -> usize {
        let mut snippets = self.snippets.write().await;
        let mut count = 0;
        for entry in entries {
            let revisions = entry.revisions.into_iter().map(|r| (r.id, r)).collect();
            snippets.insert(
                entry.snippet.id.clone(),
                StoredSnippet {
                    snippet: entry.snippet,
                    revisions,
                },
            );
            count += 1;
        }
        count
    }

    /// Release everyone waiting in [`SnippetStore::ready`].
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    /// Whether the initial load has finished.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Load a JSON snapshot (an array of [`SnapshotEntry`]) into the store.
    ///
    /// Returns the number of snippets loaded. Does not change readiness.
    pub async fn load_snapshot(&self, path: &Path) -> ServerResult<usize> {
        let data = tokio::fs::read(path).await.map_err(|e| ServerError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let entries: Vec<SnapshotEntry> = serde_json::from_slice(&data)
            .map_err(|e| ServerError::Snapshot(format!("{}: {}", path.display(), e)))?;

        Ok(self.extend(entries).await)
    }

    /// Load a snapshot in the background and mark the store ready when done.
    ///
    /// A failed load is logged and leaves the store empty but ready, so
    /// requests answer 404 instead of hanging.
    pub fn spawn_snapshot_load(self: &Arc<Self>, path: PathBuf) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            match store.load_snapshot(&path).await {
                Ok(count) => {
                    tracing::info!("Loaded {} snippet(s) from {}", count, path.display())
                }
                Err(e) => tracing::error!("Failed to load snippet snapshot: {}", e),
            }
            store.mark_ready();
        })
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // Only fails if the sender is gone, which cannot happen while &self lives
        let _ = rx.wait_for(|ready| *ready).await;
    }

    async fn lookup_snippet(&self, id: &str) -> Option<Snippet> {
        let snippets = self.snippets.read().await;
        snippets.get(id).map(|s| s.snippet.clone())
    }

    async fn lookup_revision(&self, snippet: &Snippet, id: u32) -> Option<Revision> {
        let snippets = self.snippets.read().await;
        snippets
            .get(&snippet.id)
            .and_then(|s| s.revisions.get(&id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn snippet(id: &str) -> Snippet {
        Snippet {
            id: id.to_string(),
            username: "alice".to_string(),
            title: "Hello".to_string(),
        }
    }

    fn revision(id: u32) -> Revision {
        Revision {
            id,
            code: "void run(){}".to_string(),
            language: "java".to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_lookup() {
        let store = MemoryStore::with_entries([SnapshotEntry {
            snippet: snippet("abc123"),
            revisions: vec![revision(1), revision(2)],
        }])
        .await;

        let found = store.lookup_snippet("abc123").await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(store.lookup_revision(&found, 2).await.unwrap().id, 2);
        assert!(store.lookup_revision(&found, 3).await.is_none());
        assert!(store.lookup_snippet("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_ready_blocks_until_marked() {
        let store = Arc::new(MemoryStore::new());
        assert!(!store.is_ready());

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.ready().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        store.mark_ready();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("ready() did not return")
            .unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snippets.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "abc123",
                "username": "alice",
                "title": "Hello",
                "revisions": [
                    {"id": 1, "code": "void run(){}", "language": "Java", "createdAt": "2019-05-01T10:00:00Z"}
                ]
            }]"#,
        )
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        store.spawn_snapshot_load(path).await.unwrap();
        assert!(store.is_ready());

        let snippet = store.lookup_snippet("abc123").await.unwrap();
        let revision = store.lookup_revision(&snippet, 1).await.unwrap();
        assert_eq!(revision.created_year(), Some(2019));
    }

    #[tokio::test]
    async fn test_failed_snapshot_still_becomes_ready() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());

        store
            .spawn_snapshot_load(temp.path().join("missing.json"))
            .await
            .unwrap();

        assert!(store.is_ready());
        assert!(store.lookup_snippet("abc123").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snippets.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = MemoryStore::new().load_snapshot(&path).await.unwrap_err();
        assert!(matches!(err, ServerError::Snapshot(_)));
    }
}
