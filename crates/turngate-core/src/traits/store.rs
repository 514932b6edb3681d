// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted key-value store trait.

use std::fmt;

use async_trait::async_trait;

use crate::error::TurngateError;

/// A typed composite key addressing one persisted record.
///
/// Keys carry a static namespace plus ordered parts, replacing raw
/// string keys so unrelated features cannot collide on formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    namespace: &'static str,
    parts: Vec<String>,
}

impl StoreKey {
    /// Build a key from a namespace and its ordered parts.
    pub fn new<I, S>(namespace: &'static str, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The key's namespace.
    pub fn namespace(&self) -> &str {
        self.namespace
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace)?;
        for part in &self.parts {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

/// Outcome of a conditional create-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record did not exist and was created by this call.
    Created,
    /// The record already existed; nothing was written.
    Conflict,
}

/// Persisted key-value store contract.
///
/// `write` is last-writer-wins. `write_if_absent` is the only
/// conditional operation and exists for the token-exchange deduplicator:
/// a [`WriteOutcome::Conflict`] signals a concurrent or repeated delivery
/// and must not be reported as an error. Record expiry (TTL) is the
/// implementation's concern; the sign-in core never deletes dedup
/// records.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the record at `key`, or `None` when absent.
    async fn read(&self, key: &StoreKey) -> Result<Option<serde_json::Value>, TurngateError>;

    /// Writes the record at `key`, overwriting any existing value.
    async fn write(&self, key: &StoreKey, value: serde_json::Value) -> Result<(), TurngateError>;

    /// Creates the record at `key` only if absent.
    async fn write_if_absent(
        &self,
        key: &StoreKey,
        value: serde_json::Value,
    ) -> Result<WriteOutcome, TurngateError>;

    /// Deletes the record at `key`. Deleting an absent record is a no-op.
    async fn delete(&self, key: &StoreKey) -> Result<(), TurngateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_renders_namespace_and_parts() {
        let key = StoreKey::new("auth-state", ["msteams", "conv-1", "user-1", "graph"]);
        assert_eq!(key.to_string(), "auth-state/msteams/conv-1/user-1/graph");
        assert_eq!(key.namespace(), "auth-state");
    }

    #[test]
    fn keys_with_same_parts_in_different_namespaces_differ() {
        let a = StoreKey::new("auth-state", ["x"]);
        let b = StoreKey::new("dialog-state", ["x"]);
        assert_ne!(a, b);
    }
}
