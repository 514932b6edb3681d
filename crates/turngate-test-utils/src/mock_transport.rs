// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `TurnTransport`, capturing every outbound
//! activity and invoke response for assertion in tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use turngate_core::{InvokeResponse, OutboundActivity, TurnTransport, TurngateError};

/// A transport that records everything sent through it.
#[derive(Default)]
pub struct MockTransport {
    activities: Mutex<Vec<OutboundActivity>>,
    invoke_responses: Mutex<Vec<InvokeResponse>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All activities sent so far, in order.
    pub async fn sent_activities(&self) -> Vec<OutboundActivity> {
        self.activities.lock().await.clone()
    }

    /// Count of activities sent so far.
    pub async fn sent_count(&self) -> usize {
        self.activities.lock().await.len()
    }

    /// All invoke responses sent so far, in order.
    pub async fn invoke_responses(&self) -> Vec<InvokeResponse> {
        self.invoke_responses.lock().await.clone()
    }

    /// The last invoke response sent, if any.
    pub async fn last_invoke_response(&self) -> Option<InvokeResponse> {
        self.invoke_responses.lock().await.last().cloned()
    }

    /// Clears captured activities and responses.
    pub async fn clear(&self) {
        self.activities.lock().await.clear();
        self.invoke_responses.lock().await.clear();
    }
}

#[async_trait]
impl TurnTransport for MockTransport {
    async fn send_activity(&self, activity: OutboundActivity) -> Result<(), TurngateError> {
        self.activities.lock().await.push(activity);
        Ok(())
    }

    async fn send_invoke_response(&self, response: InvokeResponse) -> Result<(), TurngateError> {
        self.invoke_responses.lock().await.push(response);
        Ok(())
    }
}
