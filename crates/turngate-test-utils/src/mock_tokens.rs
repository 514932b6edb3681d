// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock token client for deterministic testing.
//!
//! `MockTokenClient` implements `TokenClient` with scripted responses:
//! silent-lookup and exchange results are popped from FIFO queues
//! (default: no token), magic codes resolve through an accept table, and
//! every exchange call is counted so deduplication tests can assert
//! exactly-once behavior.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use turngate_core::{TokenClient, TokenResponse, TurngateError};

/// A token client with scripted outcomes and call counters.
#[derive(Default)]
pub struct MockTokenClient {
    silent: Mutex<VecDeque<Option<TokenResponse>>>,
    exchange: Mutex<VecDeque<Option<TokenResponse>>>,
    user_tokens: Mutex<HashMap<String, TokenResponse>>,
    silent_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    user_token_calls: AtomicUsize,
    signed_out: Mutex<Vec<(String, String)>>,
}

impl MockTokenClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token response with the given token string and no expiry.
    pub fn token(token: impl Into<String>) -> TokenResponse {
        TokenResponse {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Queues the result of the next silent token lookup.
    pub async fn queue_silent(&self, result: Option<TokenResponse>) {
        self.silent.lock().await.push_back(result);
    }

    /// Queues the result of the next on-behalf-of exchange.
    pub async fn queue_exchange(&self, result: Option<TokenResponse>) {
        self.exchange.lock().await.push_back(result);
    }

    /// Registers a magic code that resolves to the given token.
    pub async fn accept_code(&self, code: impl Into<String>, response: TokenResponse) {
        self.user_tokens.lock().await.insert(code.into(), response);
    }

    /// Number of exchange calls made so far.
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Number of silent lookup calls made so far.
    pub fn silent_calls(&self) -> usize {
        self.silent_calls.load(Ordering::SeqCst)
    }

    /// Number of magic-code redemption calls made so far.
    pub fn user_token_calls(&self) -> usize {
        self.user_token_calls.load(Ordering::SeqCst)
    }

    /// `(connection, user)` pairs signed out so far.
    pub async fn signed_out(&self) -> Vec<(String, String)> {
        self.signed_out.lock().await.clone()
    }
}

#[async_trait]
impl TokenClient for MockTokenClient {
    async fn get_sign_in_link(
        &self,
        connection: &str,
        user_id: &str,
        _scopes: &[String],
    ) -> Result<String, TurngateError> {
        Ok(format!(
            "https://signin.example.test/{connection}?user={user_id}"
        ))
    }

    async fn get_token_silently(
        &self,
        _connection: &str,
        _user_id: &str,
        _channel_id: &str,
        _scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError> {
        self.silent_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.silent.lock().await.pop_front().flatten())
    }

    async fn get_user_token(
        &self,
        _connection: &str,
        _user_id: &str,
        _channel_id: &str,
        magic_code: &str,
    ) -> Result<Option<TokenResponse>, TurngateError> {
        self.user_token_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.user_tokens.lock().await.get(magic_code).cloned())
    }

    async fn exchange_on_behalf_of(
        &self,
        _connection: &str,
        _user_id: &str,
        _channel_id: &str,
        _assertion: &str,
        _scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.exchange.lock().await.pop_front().flatten())
    }

    async fn sign_out(
        &self,
        connection: &str,
        user_id: &str,
        _channel_id: &str,
    ) -> Result<(), TurngateError> {
        self.signed_out
            .lock()
            .await
            .push((connection.to_string(), user_id.to_string()));
        Ok(())
    }
}
