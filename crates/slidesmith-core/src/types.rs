// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Slidesmith workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Participant id stamped on assistant turns authored by this generator.
///
/// The marker codec only trusts turns carrying this id, so similarly shaped
/// HTML comments from other chat participants cannot spoof a session.
pub const GENERATOR_PARTICIPANT: &str = "slidesmith.deck-generator";

/// One turn of the replayed chat transcript, normalized at the host-adapter
/// boundary so the core never inspects ad hoc host message shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    /// A turn typed by the user.
    User { text: String },
    /// A turn produced by some assistant participant. `participant`
    /// identifies the author; only [`GENERATOR_PARTICIPANT`] turns are ours.
    Assistant { text: String, participant: String },
}

impl ChatTurn {
    /// Returns the raw text of the turn.
    pub fn text(&self) -> &str {
        match self {
            ChatTurn::User { text } => text,
            ChatTurn::Assistant { text, .. } => text,
        }
    }

    /// True when this turn was authored by this generator.
    pub fn is_own_assistant(&self) -> bool {
        matches!(
            self,
            ChatTurn::Assistant { participant, .. } if participant == GENERATOR_PARTICIPANT
        )
    }
}

/// A user-attached context reference: a file, a line range within a file,
/// or inline text pasted into the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    File {
        id: String,
        path: PathBuf,
    },
    Selection {
        id: String,
        path: PathBuf,
        /// 1-based, inclusive.
        start_line: u32,
        /// 1-based, inclusive.
        end_line: u32,
    },
    Inline {
        id: String,
        text: String,
    },
}

impl Reference {
    /// Returns the host-assigned identifier used to label the rendered block.
    pub fn id(&self) -> &str {
        match self {
            Reference::File { id, .. }
            | Reference::Selection { id, .. }
            | Reference::Inline { id, .. } => id,
        }
    }
}

/// Role tag for one assembled model message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message in the shape the model transport expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: MessageRole,
    pub text: String,
}

impl ModelMessage {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// A request handed to a [`crate::ModelAdapter`].
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Model identifier to invoke. May differ from the adapter default when
    /// the orchestrator retries against the fallback model.
    pub model: String,
    pub messages: Vec<ModelMessage>,
    pub max_tokens: u32,
}

/// Token accounting reported by the transport, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Event discriminator for one streamed chunk of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventType {
    Start,
    Delta,
    Stop,
}

/// One incremental chunk of model output.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub event: StreamEventType,
    /// Incremental text; present on `Delta` events.
    pub text: Option<String>,
    /// Usage totals; typically reported on `Stop`.
    pub usage: Option<TokenUsage>,
}

/// Result of one generation cycle after response parsing.
///
/// When `is_valid` is false, `content` still holds the raw model text so the
/// caller can show the user exactly what was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckResponse {
    /// Document body: rendering-ready when valid, raw model text otherwise.
    pub content: String,
    /// Best-effort human-readable summary; may be empty in either state.
    pub summary: String,
    /// Whether `content` is usable as a rendering-ready deck.
    pub is_valid: bool,
}

/// Filesystem handle returned by a [`crate::DeckWorkspace`] after
/// materializing a document into its per-session sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckHandle {
    /// Path of the materialized markdown document.
    pub document_path: PathBuf,
    /// Root of the per-session rendering sandbox.
    pub project_dir: PathBuf,
}
