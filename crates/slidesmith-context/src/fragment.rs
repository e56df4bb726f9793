// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context fragments: labeled, priority-ordered, independently truncatable
//! units of prompt content.

use slidesmith_core::MessageRole;

/// The current user instruction. Never dropped, never truncated.
pub const PRIORITY_USER_INSTRUCTION: u8 = 100;
/// System instructions describing the required output shape.
pub const PRIORITY_SYSTEM_INSTRUCTIONS: u8 = 95;
/// Static Marp syntax reference. Truncated last among trimmable fragments.
pub const PRIORITY_SYNTAX_GUIDE: u8 = 90;
/// The session's most recent generated document, replayed as read-only context.
pub const PRIORITY_PRIOR_DOCUMENT: u8 = 70;
/// First user-attached reference; later references step down from here.
pub const PRIORITY_REFERENCE_BASE: u8 = 60;
/// Floor for reference priorities so many references never collide with history.
pub const PRIORITY_REFERENCE_FLOOR: u8 = 51;
/// The single most recent assistant turn, replayed in full.
pub const PRIORITY_RECENT_ASSISTANT: u8 = 50;
/// Oldest history turn; newer turns step up from here.
pub const PRIORITY_HISTORY_BASE: u8 = 10;
/// Ceiling for history priorities.
pub const PRIORITY_HISTORY_CEIL: u8 = 45;

/// One labeled, priority-ordered, independently truncatable unit of prompt
/// content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFragment {
    pub role: MessageRole,
    /// Higher priority fragments are kept preferentially under budget pressure.
    pub priority: u8,
    /// Human-readable label line; empty for unframed fragments.
    pub label: String,
    pub body: String,
    /// Render the body inside a code fence (file contents, documents).
    pub fenced: bool,
}

impl ContextFragment {
    pub fn new(role: MessageRole, priority: u8, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            role,
            priority,
            label: label.into(),
            body: body.into(),
            fenced: false,
        }
    }

    pub fn fenced(role: MessageRole, priority: u8, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            role,
            priority,
            label: label.into(),
            body: body.into(),
            fenced: true,
        }
    }

    /// Renders the fragment with its framing intact.
    pub fn render(&self) -> String {
        match (self.label.is_empty(), self.fenced) {
            (true, false) => self.body.clone(),
            (false, false) => format!("{}\n{}", self.label, self.body),
            (true, true) => format!("```\n{}\n```", self.body),
            (false, true) => format!("{}\n```\n{}\n```", self.label, self.body),
        }
    }

    /// Size of the rendered fragment in characters.
    pub fn rendered_len(&self) -> usize {
        self.render().chars().count()
    }

    /// Size of the framing alone (label and fences), in characters.
    pub fn framing_len(&self) -> usize {
        self.rendered_len() - self.body.chars().count()
    }

    /// Shrinks the body from the tail so the rendered fragment fits in
    /// `max_chars`, preserving the label and fence framing and appending an
    /// elision mark. Truncation is deterministic: same input, same cut.
    pub fn truncate_to(&mut self, max_chars: usize) {
        const ELISION: &str = "\n…[truncated]";

        if self.rendered_len() <= max_chars {
            return;
        }

        let overhead = self.framing_len() + ELISION.chars().count();
        let keep = max_chars.saturating_sub(overhead);
        let mut body: String = self.body.chars().take(keep).collect();
        body.push_str(ELISION);
        self.body = body;
    }
}
