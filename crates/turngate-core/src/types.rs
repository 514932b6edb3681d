// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Turngate workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A token issued by the identity provider, as returned by the token service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// The access token.
    pub token: String,

    /// Expiry instant, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Resource descriptor embedded in an OAuth card so the platform can
/// attempt silent SSO token exchange before interactive sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeResource {
    /// Correlation id echoed back in the token-exchange invoke.
    pub id: String,

    /// Application resource URI the exchanged token must be scoped to.
    pub uri: String,
}

/// A resolved token scoped to a single turn.
///
/// Never persisted; lives only in the per-turn transient token map and is
/// dropped with the turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    /// Connection the token was resolved for.
    pub connection: String,

    /// The access token.
    pub token: String,

    /// Expiry instant, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Build an [`AuthToken`] from a token-service response.
    pub fn from_response(connection: impl Into<String>, response: TokenResponse) -> Self {
        Self {
            connection: connection.into(),
            token: response.token,
            expires_at: response.expires_at,
        }
    }
}

/// The kind of sign-in prompt a connection uses, selected once at
/// configuration time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptKind {
    /// Interactive sign-in card with a browser link and magic-code
    /// verification.
    Card,
    /// OAuth card carrying a token-exchange resource for silent SSO, with
    /// interactive verification as the platform-driven fallback.
    Sso,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn prompt_kind_round_trips_through_display() {
        for kind in [PromptKind::Card, PromptKind::Sso] {
            let parsed = PromptKind::from_str(&kind.to_string()).expect("should parse back");
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn token_response_deserializes_without_expiry() {
        let json = r#"{ "token": "tok-1" }"#;
        let resp: TokenResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(resp.token, "tok-1");
        assert!(resp.expires_at.is_none());
    }
}
