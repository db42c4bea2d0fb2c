// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./duckie.toml` > `~/.config/duckie/duckie.toml` > `/etc/duckie/duckie.toml`
//! with environment variable overrides via `DUCKIE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DuckieConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/duckie/duckie.toml` (system-wide)
/// 3. `~/.config/duckie/duckie.toml` (user XDG config)
/// 4. `./duckie.toml` (local directory)
/// 5. `DUCKIE_*` environment variables
pub fn load_config() -> Result<DuckieConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DuckieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DuckieConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DuckieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DuckieConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DuckieConfig::default()))
        .merge(Toml::file("/etc/duckie/duckie.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("duckie/duckie.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("duckie.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `DUCKIE_INFERENCE_TIMEOUT_SECS`
/// must map to `inference.timeout_secs`, not `inference.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("DUCKIE_").map(|key| section_key(key.as_str()).into())
}

const SECTIONS: &[&str] = &["bot", "inference", "interactive", "watchdog", "journal"];

/// Map an env key (prefix already stripped, any case) to its dotted config path.
fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}
