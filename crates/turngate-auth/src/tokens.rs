// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn token propagation.

use std::collections::HashMap;

use turngate_core::AuthToken;

/// Transient tokens resolved during the current turn, keyed by
/// connection name.
///
/// Lives only for the duration of one turn; every turn re-derives
/// sign-in status. Nothing here is ever persisted.
#[derive(Debug, Default)]
pub struct TurnTokens {
    tokens: HashMap<String, AuthToken>,
}

impl TurnTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a resolved token visible to downstream handlers for the
    /// remainder of the turn.
    pub fn set(&mut self, token: AuthToken) {
        self.tokens.insert(token.connection.clone(), token);
    }

    /// The token for a connection, when one was resolved this turn.
    pub fn get(&self, connection: &str) -> Option<&AuthToken> {
        self.tokens.get(connection)
    }

    /// Removes and returns the token for a connection.
    pub fn remove(&mut self, connection: &str) -> Option<AuthToken> {
        self.tokens.remove(connection)
    }

    /// Drops every token. Hosts call this at end of turn; dropping the
    /// map does the same.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(connection: &str) -> AuthToken {
        AuthToken {
            connection: connection.into(),
            token: "tok".into(),
            expires_at: None,
        }
    }

    #[test]
    fn set_get_remove_round_trip() {
        let mut tokens = TurnTokens::new();
        assert!(tokens.get("graph").is_none());

        tokens.set(token("graph"));
        assert_eq!(tokens.get("graph").map(|t| t.token.as_str()), Some("tok"));
        assert!(tokens.get("github").is_none());

        assert!(tokens.remove("graph").is_some());
        assert!(tokens.is_empty());
    }

    #[test]
    fn clear_drops_all_connections() {
        let mut tokens = TurnTokens::new();
        tokens.set(token("graph"));
        tokens.set(token("github"));
        tokens.clear();
        assert!(tokens.is_empty());
    }
}
