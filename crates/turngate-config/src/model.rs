// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Turngate sign-in library.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

use turngate_core::PromptKind;

/// Top-level Turngate configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. The `[[connection]]` array declares the named
/// identity-provider connections users can sign into.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TurngateConfig {
    /// Token service endpoint settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Named identity-provider connections.
    #[serde(default, rename = "connection")]
    pub connections: Vec<ConnectionConfig>,
}

/// Token service endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Base URL of the hosted token service. `None` disables the REST
    /// token client; hosts then supply their own `TokenClient`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token used to authenticate against the token service.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// One named identity-provider connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection name users and handlers refer to.
    pub name: String,

    /// Sign-in prompt kind: `"card"` (interactive link + magic code) or
    /// `"sso"` (silent token exchange with interactive fallback).
    #[serde(default = "default_prompt")]
    pub prompt: PromptKind,

    /// OAuth scopes requested for this connection.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Sign-in dialog expiry in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Automatic re-prompt attempts after a declined or failed exchange.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,

    /// End the dialog when a non-auth message arrives mid-flow instead of
    /// keeping the prompt pending.
    #[serde(default)]
    pub end_on_invalid_message: bool,

    /// Application resource URI for the SSO token-exchange resource.
    #[serde(default)]
    pub token_exchange_uri: Option<String>,

    /// Use this connection when callers do not name one. At most one
    /// connection may set this; otherwise the first declared wins.
    #[serde(default)]
    pub default: bool,
}

fn default_prompt() -> PromptKind {
    PromptKind::Card
}

fn default_timeout_secs() -> u64 {
    // Platform default observed for sign-in prompts.
    900
}

fn default_max_retries() -> u8 {
    1
}
