// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed persisted state for in-progress sign-in flows.
//!
//! Two records exist per `(channel, conversation, user, connection)` key:
//! the conversation auth state (captured message + retry counter) and the
//! dialog state (active prompt + expiry). Both live only while a flow is
//! in progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use turngate_core::{Activity, KeyValueStore, PromptKind, StoreKey, TurngateError};

pub(crate) const AUTH_STATE_NAMESPACE: &str = "auth-state";
pub(crate) const DIALOG_STATE_NAMESPACE: &str = "dialog-state";

/// Composite key identifying one user's sign-in flow for one connection.
///
/// Connections are fully independent: the same user mid-flow for
/// connection A has unrelated records for connection B.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub channel_id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub connection: String,
}

impl FlowKey {
    /// Derive the flow key for an inbound activity and a connection name.
    pub fn from_activity(activity: &Activity, connection: &str) -> Self {
        Self {
            channel_id: activity.channel_id.clone(),
            conversation_id: activity.conversation_id.clone(),
            user_id: activity.user_id.clone(),
            connection: connection.to_string(),
        }
    }

    pub(crate) fn auth_state_key(&self) -> StoreKey {
        StoreKey::new(AUTH_STATE_NAMESPACE, self.parts())
    }

    pub(crate) fn dialog_state_key(&self) -> StoreKey {
        StoreKey::new(DIALOG_STATE_NAMESPACE, self.parts())
    }

    fn parts(&self) -> [&str; 4] {
        [
            &self.channel_id,
            &self.conversation_id,
            &self.user_id,
            &self.connection,
        ]
    }
}

/// Conversation-scoped auth state, alive only while a flow is in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAuthState {
    /// The user message that triggered sign-in, restored into the turn
    /// once the flow completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_message: Option<String>,

    /// Declined/failed prompt count, bounding automatic re-prompts.
    #[serde(default)]
    pub attempts: u8,
}

/// Persisted prompt state, alive iff a prompt awaits a platform-driven
/// continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    /// The prompt kind selected at connection construction.
    pub prompt: PromptKind,

    /// Instant after which any continuation resolves to a timeout.
    pub expires_at: DateTime<Utc>,

    /// Scopes the prompt was issued for.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Typed accessors over the raw key-value store.
///
/// Serialization failures of persisted records surface as storage errors;
/// a record that cannot be decoded is indistinguishable from a corrupt
/// store entry as far as callers are concerned.
#[derive(Clone)]
pub struct AuthStateStore {
    store: Arc<dyn KeyValueStore>,
}

impl AuthStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_auth(
        &self,
        key: &FlowKey,
    ) -> Result<Option<ConversationAuthState>, TurngateError> {
        match self.store.read(&key.auth_state_key()).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(TurngateError::storage)?,
            )),
            None => Ok(None),
        }
    }

    pub async fn save_auth(
        &self,
        key: &FlowKey,
        state: &ConversationAuthState,
    ) -> Result<(), TurngateError> {
        let value = serde_json::to_value(state).map_err(TurngateError::storage)?;
        self.store.write(&key.auth_state_key(), value).await
    }

    pub async fn clear_auth(&self, key: &FlowKey) -> Result<(), TurngateError> {
        self.store.delete(&key.auth_state_key()).await
    }

    pub async fn load_dialog(&self, key: &FlowKey) -> Result<Option<DialogState>, TurngateError> {
        match self.store.read(&key.dialog_state_key()).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(TurngateError::storage)?,
            )),
            None => Ok(None),
        }
    }

    pub async fn save_dialog(
        &self,
        key: &FlowKey,
        state: &DialogState,
    ) -> Result<(), TurngateError> {
        let value = serde_json::to_value(state).map_err(TurngateError::storage)?;
        self.store.write(&key.dialog_state_key(), value).await
    }

    pub async fn clear_dialog(&self, key: &FlowKey) -> Result<(), TurngateError> {
        self.store.delete(&key.dialog_state_key()).await
    }

    /// Deletes both records for the key.
    pub async fn clear_all(&self, key: &FlowKey) -> Result<(), TurngateError> {
        self.clear_dialog(key).await?;
        self.clear_auth(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turngate_storage::MemoryStore;

    fn flow_key(connection: &str) -> FlowKey {
        FlowKey {
            channel_id: "msteams".into(),
            conversation_id: "conv-1".into(),
            user_id: "user-1".into(),
            connection: connection.into(),
        }
    }

    #[tokio::test]
    async fn auth_state_round_trips() {
        let states = AuthStateStore::new(Arc::new(MemoryStore::new()));
        let key = flow_key("graph");

        assert!(states.load_auth(&key).await.expect("load").is_none());

        let state = ConversationAuthState {
            pending_message: Some("book a meeting".into()),
            attempts: 1,
        };
        states.save_auth(&key, &state).await.expect("save");
        let loaded = states.load_auth(&key).await.expect("load").expect("present");
        assert_eq!(loaded, state);

        states.clear_auth(&key).await.expect("clear");
        assert!(states.load_auth(&key).await.expect("load").is_none());
    }

    #[tokio::test]
    async fn dialog_state_round_trips() {
        let states = AuthStateStore::new(Arc::new(MemoryStore::new()));
        let key = flow_key("graph");

        let state = DialogState {
            prompt: PromptKind::Sso,
            expires_at: Utc::now(),
            scopes: vec!["User.Read".into()],
        };
        states.save_dialog(&key, &state).await.expect("save");
        let loaded = states
            .load_dialog(&key)
            .await
            .expect("load")
            .expect("present");
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn records_for_different_connections_are_independent() {
        let states = AuthStateStore::new(Arc::new(MemoryStore::new()));
        let graph = flow_key("graph");
        let github = flow_key("github");

        states
            .save_auth(&graph, &ConversationAuthState::default())
            .await
            .expect("save");
        assert!(states.load_auth(&github).await.expect("load").is_none());

        states.clear_all(&github).await.expect("clear");
        assert!(states.load_auth(&graph).await.expect("load").is_some());
    }
}
