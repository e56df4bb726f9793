// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering sandbox trait for the external slide-rendering toolchain.
//!
//! Symlink-vs-copy fallback, port probing, and process management are all
//! collaborator-side concerns hidden behind this capability interface so the
//! orchestrator stays independent of OS specifics.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SlidesmithError;
use crate::types::DeckHandle;

/// Manages per-session rendering sandboxes for generated decks.
///
/// Implementations key sandboxes by session id so repeated turns of the same
/// conversation reuse one project directory, preserving edit/preview
/// continuity instead of scattering throwaway temp files.
#[async_trait]
pub trait DeckWorkspace: Send + Sync {
    /// Writes the document into the session's sandbox, creating it if needed.
    async fn materialize(
        &self,
        session_id: &str,
        document: &str,
    ) -> Result<DeckHandle, SlidesmithError>;

    /// Starts (or reuses) a live local preview for the materialized deck and
    /// returns its URL.
    async fn preview(&self, handle: &DeckHandle) -> Result<String, SlidesmithError>;

    /// Exports the deck to a portable format at `destination`.
    async fn export(
        &self,
        handle: &DeckHandle,
        destination: &Path,
    ) -> Result<PathBuf, SlidesmithError>;
}
