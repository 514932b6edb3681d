// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DashMap-backed store with monotonic etags.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use turngate_core::traits::{KeyValueStore, StoreKey, WriteOutcome};
use turngate_core::TurngateError;

/// One stored record with its version tag.
#[derive(Debug, Clone)]
struct StoredEntry {
    value: serde_json::Value,
    etag: u64,
}

/// In-memory [`KeyValueStore`].
///
/// `write_if_absent` resolves races through the map's entry API: of two
/// concurrent writers for the same key, exactly one observes
/// [`WriteOutcome::Created`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
    versions: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The version tag of the record at `key`, when present.
    pub fn etag(&self, key: &StoreKey) -> Option<u64> {
        self.entries.get(&key.to_string()).map(|e| e.etag)
    }

    fn next_etag(&self) -> u64 {
        self.versions.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &StoreKey) -> Result<Option<serde_json::Value>, TurngateError> {
        Ok(self.entries.get(&key.to_string()).map(|e| e.value.clone()))
    }

    async fn write(&self, key: &StoreKey, value: serde_json::Value) -> Result<(), TurngateError> {
        let etag = self.next_etag();
        trace!(key = %key, etag, "write");
        self.entries.insert(key.to_string(), StoredEntry { value, etag });
        Ok(())
    }

    async fn write_if_absent(
        &self,
        key: &StoreKey,
        value: serde_json::Value,
    ) -> Result<WriteOutcome, TurngateError> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => {
                trace!(key = %key, "write_if_absent conflict");
                Ok(WriteOutcome::Conflict)
            }
            Entry::Vacant(slot) => {
                let etag = self.next_etag();
                trace!(key = %key, etag, "write_if_absent created");
                slot.insert(StoredEntry { value, etag });
                Ok(WriteOutcome::Created)
            }
        }
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), TurngateError> {
        trace!(key = %key, "delete");
        self.entries.remove(&key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn key(parts: &[&str]) -> StoreKey {
        StoreKey::new("test", parts.iter().copied())
    }

    #[tokio::test]
    async fn read_returns_what_write_stored() {
        let store = MemoryStore::new();
        let k = key(&["a"]);
        store
            .write(&k, serde_json::json!({ "n": 1 }))
            .await
            .expect("write");
        let value = store.read(&k).await.expect("read").expect("present");
        assert_eq!(value["n"], 1);
    }

    #[tokio::test]
    async fn write_overwrites_and_bumps_etag() {
        let store = MemoryStore::new();
        let k = key(&["a"]);
        store.write(&k, serde_json::json!(1)).await.expect("write");
        let first = store.etag(&k).expect("etag");
        store.write(&k, serde_json::json!(2)).await.expect("write");
        let second = store.etag(&k).expect("etag");
        assert!(second > first);
        assert_eq!(store.read(&k).await.expect("read"), Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn write_if_absent_yields_created_then_conflict() {
        let store = MemoryStore::new();
        let k = key(&["dedup", "act-1"]);
        let first = store
            .write_if_absent(&k, serde_json::json!({}))
            .await
            .expect("first");
        let second = store
            .write_if_absent(&k, serde_json::json!({ "other": true }))
            .await
            .expect("second");
        assert_eq!(first, WriteOutcome::Created);
        assert_eq!(second, WriteOutcome::Conflict);
        // The losing write must not clobber the original value.
        assert_eq!(
            store.read(&k).await.expect("read"),
            Some(serde_json::json!({}))
        );
    }

    #[tokio::test]
    async fn concurrent_conditional_writes_admit_exactly_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let k = key(&["dedup", "act-2"]);

        let a = {
            let store = Arc::clone(&store);
            let k = k.clone();
            tokio::spawn(async move { store.write_if_absent(&k, serde_json::json!(1)).await })
        };
        let b = {
            let store = Arc::clone(&store);
            let k = k.clone();
            tokio::spawn(async move { store.write_if_absent(&k, serde_json::json!(2)).await })
        };

        let outcomes = [
            a.await.expect("join").expect("write"),
            b.await.expect("join").expect("write"),
        ];
        let created = outcomes
            .iter()
            .filter(|o| **o == WriteOutcome::Created)
            .count();
        assert_eq!(created, 1, "exactly one writer must win, got {outcomes:?}");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let k = key(&["a"]);
        store.write(&k, serde_json::json!(1)).await.expect("write");
        store.delete(&k).await.expect("delete");
        store.delete(&k).await.expect("second delete is a no-op");
        assert!(store.read(&k).await.expect("read").is_none());
        assert!(store.is_empty());
    }
}
