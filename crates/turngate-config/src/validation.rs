// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as unique connection names and sane timeouts.

use std::collections::HashSet;

use turngate_core::PromptKind;

use crate::diagnostic::ConfigError;
use crate::model::TurngateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &TurngateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Connection names are non-empty and unique.
    let mut seen_names = HashSet::new();
    for (i, conn) in config.connections.iter().enumerate() {
        if conn.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("connection[{i}].name must not be empty"),
            });
        } else if !seen_names.insert(conn.name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate connection name `{}` in [[connection]] array",
                    conn.name
                ),
            });
        }
    }

    // At most one connection may be flagged default.
    let defaults: Vec<&str> = config
        .connections
        .iter()
        .filter(|c| c.default)
        .map(|c| c.name.as_str())
        .collect();
    if defaults.len() > 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "only one connection may set `default = true`, found: {}",
                defaults.join(", ")
            ),
        });
    }

    // Dialog timeouts must be positive.
    for conn in &config.connections {
        if conn.timeout_secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!(
                    "connection `{}`: timeout_secs must be greater than zero",
                    conn.name
                ),
            });
        }
    }

    // SSO connections need a token-exchange resource URI to build the
    // OAuth card's silent-exchange hint.
    for conn in &config.connections {
        if conn.prompt == PromptKind::Sso
            && conn
                .token_exchange_uri
                .as_deref()
                .is_none_or(|uri| uri.trim().is_empty())
        {
            errors.push(ConfigError::Validation {
                message: format!(
                    "connection `{}`: prompt = \"sso\" requires token_exchange_uri",
                    conn.name
                ),
            });
        }
    }

    // A configured base_url must parse as an absolute http(s) URL.
    if let Some(base_url) = config.service.base_url.as_deref()
        && !base_url.trim().is_empty()
        && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("service.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.service.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "service.request_timeout_secs must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
