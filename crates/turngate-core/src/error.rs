// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Turngate sign-in orchestration library.

use thiserror::Error;

/// The primary error type used across all Turngate boundary traits and
/// flow operations.
///
/// Flow-control outcomes (a pending prompt, a declined exchange, a
/// duplicate delivery) are never represented here; they are ordinary
/// return values of the sign-in machinery. Only misconfiguration and
/// unexpected I/O reach the hosting application as errors.
#[derive(Debug, Error)]
pub enum TurngateError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The turn's activity cannot initiate or continue any recognized sign-in flow.
    #[error("activity cannot take part in a sign-in flow: {0}")]
    InvalidActivity(String),

    /// Registry lookup for a connection name that was never configured.
    #[error("unknown connection: {name}")]
    UnknownConnection { name: String },

    /// Persisted key-value store errors (read, write, conditional write).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Token service errors (sign-in link issuance, exchange, silent lookup).
    #[error("token service error: {message}")]
    TokenService {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport errors (outbound activity or invoke response delivery).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A second invoke response was attempted for the same invoke turn.
    #[error("invoke response already sent for this turn")]
    InvokeAlreadyAcknowledged,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TurngateError {
    /// Wrap a storage-layer failure.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        TurngateError::Storage {
            source: Box::new(source),
        }
    }

    /// Wrap a token-service failure with context.
    pub fn token_service(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TurngateError::TokenService {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
