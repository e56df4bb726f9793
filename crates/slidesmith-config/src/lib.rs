// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML + environment configuration for the Slidesmith deck generator.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AgentConfig, ContextConfig, GenerationConfig, SessionConfig, SlidesmithConfig};
