// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across Slidesmith crates.
//!
//! [`MockModel`] replays scripted streaming replies and records every
//! request it receives; [`MockWorkspace`] stands in for the deck
//! rendering sandbox with a plain directory tree.

mod mock_model;
mod mock_workspace;

pub use mock_model::{MockModel, ScriptedReply};
pub use mock_workspace::MockWorkspace;
