// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Slidesmith deck generator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Slidesmith configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlidesmithConfig {
    /// Generator identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model selection and output limits.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Prompt assembly budget settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Session store settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Generator identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the generator.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

/// Model selection and output limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Model requested by default when the host does not pin one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Fixed fallback model for the single model-not-supported retry.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Maximum output tokens requested per generation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            fallback_model: default_fallback_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Prompt assembly budget configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Upper bound on assembled prompt size, in characters.
    ///
    /// The effective budget is the minimum of this and whatever the model
    /// adapter reports.
    #[serde(default = "default_input_budget_chars")]
    pub input_budget_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            input_budget_chars: default_input_budget_chars(),
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// SQLite database path. Defaults to `<data dir>/slidesmith/sessions.db`.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Sessions idle longer than this are swept, together with their
    /// rendering sandboxes.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            ttl_days: default_ttl_days(),
        }
    }
}

impl SessionConfig {
    /// Resolves the database path, falling back to the XDG data directory.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("slidesmith/sessions.db")
        })
    }
}

fn default_agent_name() -> String {
    "slidesmith".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_fallback_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_input_budget_chars() -> usize {
    48_000
}

fn default_ttl_days() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SlidesmithConfig::default();
        assert_eq!(config.agent.name, "slidesmith");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.generation.default_model, "gpt-4o");
        assert_eq!(config.generation.fallback_model, "gpt-4o-mini");
        assert_eq!(config.generation.max_tokens, 4096);
        assert_eq!(config.context.input_budget_chars, 48_000);
        assert_eq!(config.session.ttl_days, 30);
        assert!(config.session.db_path.is_none());
    }

    #[test]
    fn resolved_db_path_honors_explicit_path() {
        let session = SessionConfig {
            db_path: Some(PathBuf::from("/tmp/custom.db")),
            ttl_days: 30,
        };
        assert_eq!(session.resolved_db_path(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn resolved_db_path_defaults_under_data_dir() {
        let session = SessionConfig::default();
        let path = session.resolved_db_path();
        assert!(path.ends_with("slidesmith/sessions.db"));
    }
}
