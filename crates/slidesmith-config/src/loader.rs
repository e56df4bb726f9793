// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./slidesmith.toml` > `~/.config/slidesmith/slidesmith.toml`
//! > `/etc/slidesmith/slidesmith.toml` with environment variable overrides via
//! `SLIDESMITH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SlidesmithConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/slidesmith/slidesmith.toml` (system-wide)
/// 3. `~/.config/slidesmith/slidesmith.toml` (user XDG config)
/// 4. `./slidesmith.toml` (local directory)
/// 5. `SLIDESMITH_*` environment variables
pub fn load_config() -> Result<SlidesmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlidesmithConfig::default()))
        .merge(Toml::file("/etc/slidesmith/slidesmith.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("slidesmith/slidesmith.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("slidesmith.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SlidesmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlidesmithConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SlidesmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlidesmithConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SLIDESMITH_SESSION_TTL_DAYS` must map to
/// `session.ttl_days`, not `session.ttl.days`.
fn env_provider() -> Env {
    Env::prefixed("SLIDESMITH_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("context_", "context.", 1)
            .replacen("session_", "session.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.generation.default_model, "gpt-4o");
        assert_eq!(config.session.ttl_days, 30);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [generation]
            default_model = "gpt-5"
            max_tokens = 2048

            [session]
            ttl_days = 7
            db_path = "/tmp/sessions.db"

            [context]
            input_budget_chars = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.default_model, "gpt-5");
        assert_eq!(config.generation.max_tokens, 2048);
        assert_eq!(config.session.ttl_days, 7);
        assert_eq!(config.context.input_budget_chars, 1000);
        // Unspecified fields keep their defaults.
        assert_eq!(config.generation.fallback_model, "gpt-4o-mini");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [generation]
            defualt_model = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
