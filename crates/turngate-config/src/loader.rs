// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./turngate.toml` > `~/.config/turngate/turngate.toml`
//! > `/etc/turngate/turngate.toml` with environment variable overrides via
//! the `TURNGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TurngateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/turngate/turngate.toml` (system-wide)
/// 3. `~/.config/turngate/turngate.toml` (user XDG config)
/// 4. `./turngate.toml` (local directory)
/// 5. `TURNGATE_*` environment variables
pub fn load_config() -> Result<TurngateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TurngateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TurngateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TurngateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TurngateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TurngateConfig::default()))
        .merge(Toml::file("/etc/turngate/turngate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("turngate/turngate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("turngate.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TURNGATE_SERVICE_BASE_URL` must map
/// to `service.base_url`, not `service.base.url`. The `[[connection]]`
/// array cannot be addressed through env vars; connections come from
/// TOML files.
fn env_provider() -> Env {
    Env::prefixed("TURNGATE_").map(|key| {
        let mapped = key.as_str().replacen("service_", "service.", 1);
        mapped.into()
    })
}
