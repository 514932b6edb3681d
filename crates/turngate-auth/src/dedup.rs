// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate suppression for token-exchange invokes.
//!
//! Platforms may deliver the same token-exchange invoke to more than one
//! running instance, or redeliver on an ambiguous ack. Identity-provider
//! codes are single-use, so a second exchange for the same delivery
//! would fail and surface as a spurious user-visible error. The first
//! writer of the dedup record wins; everyone else acknowledges and moves
//! on.

use std::sync::Arc;

use tracing::debug;

use turngate_core::{Clock, KeyValueStore, StoreKey, TurngateError, WriteOutcome};

pub(crate) const DEDUP_NAMESPACE: &str = "token-exchange-dedup";

/// First-writer-wins claim over a token-exchange delivery.
pub struct ExchangeDeduplicator {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ExchangeDeduplicator {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether this delivery of a token-exchange invoke should be processed.
    ///
    /// `Ok(false)` means another delivery of the same invoke already
    /// claimed it; the caller must acknowledge without attempting the
    /// exchange and without touching dialog state. Storage failures other
    /// than the conditional-write conflict propagate; they are a
    /// retryable failure of the turn, not a duplicate.
    pub async fn should_process(
        &self,
        channel_id: &str,
        conversation_id: &str,
        activity_id: &str,
    ) -> Result<bool, TurngateError> {
        let key = StoreKey::new(DEDUP_NAMESPACE, [channel_id, conversation_id, activity_id]);
        let record = serde_json::json!({ "claimedAt": self.clock.now().to_rfc3339() });

        match self.store.write_if_absent(&key, record).await? {
            WriteOutcome::Created => Ok(true),
            WriteOutcome::Conflict => {
                debug!(activity_id, "duplicate token-exchange delivery skipped");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use turngate_core::SystemClock;
    use turngate_storage::MemoryStore;

    #[tokio::test]
    async fn first_claim_wins_second_is_duplicate() {
        let dedup = ExchangeDeduplicator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        );

        assert!(dedup.should_process("c", "v", "act-1").await.expect("first"));
        assert!(!dedup.should_process("c", "v", "act-1").await.expect("second"));
    }

    #[tokio::test]
    async fn distinct_activity_ids_are_independent() {
        let dedup = ExchangeDeduplicator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        );

        assert!(dedup.should_process("c", "v", "act-1").await.expect("a"));
        assert!(dedup.should_process("c", "v", "act-2").await.expect("b"));
        assert!(dedup.should_process("c", "other", "act-1").await.expect("c"));
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn read(
            &self,
            _key: &StoreKey,
        ) -> Result<Option<serde_json::Value>, TurngateError> {
            Err(TurngateError::storage(std::io::Error::other("down")))
        }

        async fn write(
            &self,
            _key: &StoreKey,
            _value: serde_json::Value,
        ) -> Result<(), TurngateError> {
            Err(TurngateError::storage(std::io::Error::other("down")))
        }

        async fn write_if_absent(
            &self,
            _key: &StoreKey,
            _value: serde_json::Value,
        ) -> Result<WriteOutcome, TurngateError> {
            Err(TurngateError::storage(std::io::Error::other("down")))
        }

        async fn delete(&self, _key: &StoreKey) -> Result<(), TurngateError> {
            Err(TurngateError::storage(std::io::Error::other("down")))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_not_disguised_as_duplicate() {
        let dedup = ExchangeDeduplicator::new(Arc::new(FailingStore), Arc::new(SystemClock));
        let err = dedup
            .should_process("c", "v", "act-1")
            .await
            .expect_err("storage failure must propagate");
        assert!(matches!(err, TurngateError::Storage { .. }));
    }
}
