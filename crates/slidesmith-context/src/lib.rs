// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for the Slidesmith deck generator.
//!
//! Converts heterogeneous inputs (the new user instruction, replayed chat
//! history, attached references, the session's prior deck) into an ordered,
//! priority-weighted fragment set that always fits the transport's input
//! budget, then renders it into role-tagged messages.
//!
//! Older assistant turns authored by this generator are collapsed to their
//! extracted summaries instead of replaying full decks; the single most
//! recent assistant turn is preserved in full for continuity cues the
//! summary may omit.

pub mod budget;
pub mod fragment;
pub mod reference;

use std::sync::LazyLock;

use tracing::{debug, warn};

use slidesmith_core::{ChatTurn, MessageRole, ModelMessage, Reference};
use slidesmith_session::Session;

use crate::fragment::*;

/// System instructions describing the required reply shape.
pub static SYSTEM_INSTRUCTIONS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "You are a presentation author. Produce a complete Marp markdown slide deck.\n\
         Reply with the deck between the lines `{}` and `{}`.\n\
         After the deck, add a one-to-three sentence description of what you produced \
         between the lines `{}` and `{}`.\n\
         The deck must start with a `---` YAML front-matter block containing `marp: true` \
         and must separate slides with `---` lines.",
        slidesmith_parser::CONTENT_START,
        slidesmith_parser::CONTENT_END,
        slidesmith_parser::SUMMARY_START,
        slidesmith_parser::SUMMARY_END,
    )
});

/// Static reference for the Marp markup dialect. Not user data; included on
/// every request and trimmed last under budget pressure.
pub const SYNTAX_GUIDE: &str = "\
Marp syntax reference:
- The document opens with a YAML front-matter block between `---` lines. \
Recognized keys include `marp: true`, `theme`, `paginate`, `header`, `footer`.
- Slides are separated by a line containing only `---`.
- Per-slide directives are HTML comments, e.g. `<!-- _class: lead -->`.
- Standard markdown applies inside a slide: headings, lists, tables, \
`![alt](url)` images, and fenced code blocks.
- Background images use directives such as `![bg fit](url)`.
- Scoped styling goes in a `<style scoped>` block inside the slide.";

/// Assembles role-tagged model messages under a character budget.
pub struct ContextAssembler {
    budget_chars: usize,
}

impl ContextAssembler {
    pub fn new(budget_chars: usize) -> Self {
        Self { budget_chars }
    }

    /// Builds the richest prompt that fits the budget.
    ///
    /// Never fails: if rich assembly goes wrong internally, a minimal prompt
    /// carrying the raw user instruction plus a restated structural
    /// requirement is returned instead. Generation must not hard-fail merely
    /// because enrichment failed.
    pub async fn assemble(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        references: &[Reference],
        prior_session: Option<&Session>,
    ) -> Vec<ModelMessage> {
        match self
            .assemble_rich(prompt, history, references, prior_session)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "rich context assembly failed, using minimal prompt");
                fallback_messages(prompt)
            }
        }
    }

    async fn assemble_rich(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        references: &[Reference],
        prior_session: Option<&Session>,
    ) -> Result<Vec<ModelMessage>, slidesmith_core::SlidesmithError> {
        let mut fragments: Vec<ContextFragment> = vec![
            ContextFragment::new(
                MessageRole::System,
                PRIORITY_SYSTEM_INSTRUCTIONS,
                "",
                SYSTEM_INSTRUCTIONS.as_str(),
            ),
            ContextFragment::new(MessageRole::System, PRIORITY_SYNTAX_GUIDE, "", SYNTAX_GUIDE),
        ];

        // History replays oldest-first, before the reference material and the
        // new instruction.
        fragments.extend(history_fragments(history));

        for (index, reference) in references.iter().enumerate() {
            let priority = PRIORITY_REFERENCE_BASE
                .saturating_sub(index as u8)
                .max(PRIORITY_REFERENCE_FLOOR);
            fragments.push(reference::render_reference(reference, priority).await);
        }

        if let Some(fragment) = prior_document_fragment(prior_session).await {
            fragments.push(fragment);
        }

        fragments.push(ContextFragment::new(
            MessageRole::User,
            PRIORITY_USER_INSTRUCTION,
            "",
            prompt,
        ));

        let fragments = budget::fit_to_budget(fragments, self.budget_chars);

        let messages: Vec<ModelMessage> = fragments
            .iter()
            .map(|f| ModelMessage::new(f.role, f.render()))
            .collect();

        // The user instruction is load-bearing; its absence means assembly
        // went wrong and the caller should fall back.
        if !messages
            .iter()
            .any(|m| m.role == MessageRole::User && m.text.contains(prompt))
        {
            return Err(slidesmith_core::SlidesmithError::Internal(
                "assembled prompt lost the user instruction".into(),
            ));
        }

        Ok(messages)
    }
}

/// The minimal prompt used when rich assembly fails.
pub fn fallback_messages(prompt: &str) -> Vec<ModelMessage> {
    vec![
        ModelMessage::new(
            MessageRole::System,
            SYSTEM_INSTRUCTIONS.as_str(),
        ),
        ModelMessage::new(MessageRole::User, prompt),
    ]
}

/// Converts the transcript into fragments, collapsing this generator's older
/// assistant turns to their extracted summaries.
fn history_fragments(history: &[ChatTurn]) -> Vec<ContextFragment> {
    let last_assistant = history
        .iter()
        .rposition(|turn| matches!(turn, ChatTurn::Assistant { .. }));

    history
        .iter()
        .enumerate()
        .map(|(index, turn)| {
            let priority = (PRIORITY_HISTORY_BASE.saturating_add(index as u8))
                .min(PRIORITY_HISTORY_CEIL);

            match turn {
                ChatTurn::User { text } => {
                    ContextFragment::new(MessageRole::User, priority, "", text.clone())
                }
                ChatTurn::Assistant { text, .. } => {
                    let is_most_recent = Some(index) == last_assistant;
                    if is_most_recent {
                        // Full replay: continuity cues the summary may omit.
                        ContextFragment::new(
                            MessageRole::Assistant,
                            PRIORITY_RECENT_ASSISTANT,
                            "",
                            text.clone(),
                        )
                    } else if turn.is_own_assistant() {
                        ContextFragment::new(
                            MessageRole::Assistant,
                            priority,
                            "[earlier generated deck, summarized]",
                            collapse_own_turn(text),
                        )
                    } else {
                        ContextFragment::new(
                            MessageRole::Assistant,
                            priority,
                            "",
                            text.clone(),
                        )
                    }
                }
            }
        })
        .collect()
}

/// Reduces one of our earlier replies to its summary, so the budget is not
/// re-spent on content already summarized.
fn collapse_own_turn(text: &str) -> String {
    let parsed = slidesmith_parser::parse(text);
    if !parsed.summary.is_empty() {
        return parsed.summary;
    }
    text.chars().take(200).collect()
}

/// Replays the session's last generated document as read-only context,
/// enabling "continue/modify my last deck" semantics.
async fn prior_document_fragment(session: Option<&Session>) -> Option<ContextFragment> {
    let session = session?;
    let path = session.document_path.as_deref()?;

    match tokio::fs::read_to_string(path).await {
        Ok(document) => Some(ContextFragment::fenced(
            MessageRole::User,
            PRIORITY_PRIOR_DOCUMENT,
            "[current deck (read-only context, modify per the new instruction)]",
            document,
        )),
        Err(e) => {
            debug!(path = path, error = %e, "prior document unreadable, continuing without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use slidesmith_core::GENERATOR_PARTICIPANT;
    use std::path::PathBuf;

    fn session_with_document(path: Option<String>) -> Session {
        Session {
            id: "a".repeat(24),
            created_at: Utc::now(),
            last_active_at: Utc::now(),
            document_path: path,
            project_path: None,
            export_path: None,
        }
    }

    fn own_deck_turn(summary: &str) -> ChatTurn {
        ChatTurn::Assistant {
            text: format!(
                "---\nmarp: true\n---\n\n# Deck\n\nLong enough body text for validity checks.\n\n---\n\n# More\n{}\n{summary}\n{}",
                slidesmith_parser::SUMMARY_START,
                slidesmith_parser::SUMMARY_END,
            ),
            participant: GENERATOR_PARTICIPANT.into(),
        }
    }

    #[tokio::test]
    async fn minimal_request_has_system_then_user() {
        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("make a deck", &[], &[], None).await;

        assert!(messages.len() >= 3);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].text.contains(slidesmith_parser::CONTENT_START));
        assert_eq!(messages.last().unwrap().role, MessageRole::User);
        assert_eq!(messages.last().unwrap().text, "make a deck");
    }

    #[tokio::test]
    async fn syntax_guide_is_always_present() {
        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("anything", &[], &[], None).await;
        assert!(messages.iter().any(|m| m.text.contains("Marp syntax reference")));
    }

    #[tokio::test]
    async fn older_own_turns_are_collapsed_to_summaries() {
        let history = vec![
            ChatTurn::User { text: "first ask".into() },
            own_deck_turn("A deck about birds."),
            ChatTurn::User { text: "second ask".into() },
            own_deck_turn("A deck about fish."),
        ];

        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("third ask", &history, &[], None).await;

        let assistant_texts: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(assistant_texts.len(), 2);
        // Older turn collapsed: summary only, no deck body.
        assert!(assistant_texts[0].contains("A deck about birds."));
        assert!(!assistant_texts[0].contains("marp: true"));
        // Most recent assistant turn replayed in full.
        assert!(assistant_texts[1].contains("marp: true"));
    }

    #[tokio::test]
    async fn foreign_assistant_turns_replay_verbatim() {
        let history = vec![
            ChatTurn::Assistant {
                text: "unrelated bot chatter".into(),
                participant: "other.bot".into(),
            },
            ChatTurn::User { text: "ask".into() },
            own_deck_turn("Recent deck."),
        ];

        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("go", &history, &[], None).await;
        assert!(messages.iter().any(|m| m.text == "unrelated bot chatter"));
    }

    #[tokio::test]
    async fn prior_document_is_replayed_as_read_only_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.md");
        tokio::fs::write(&path, "---\nmarp: true\n---\n\n# Existing")
            .await
            .unwrap();

        let session = session_with_document(Some(path.to_string_lossy().into_owned()));
        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("tweak it", &[], &[], Some(&session)).await;

        let prior = messages
            .iter()
            .find(|m| m.text.contains("read-only context"))
            .expect("prior deck fragment");
        assert!(prior.text.contains("# Existing"));
    }

    #[tokio::test]
    async fn missing_prior_document_is_skipped_silently() {
        let session = session_with_document(Some("/nonexistent/deck.md".into()));
        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("go", &[], &[], Some(&session)).await;
        assert!(!messages.iter().any(|m| m.text.contains("read-only context")));
        assert_eq!(messages.last().unwrap().text, "go");
    }

    #[tokio::test]
    async fn unreadable_reference_does_not_sink_assembly() {
        let references = vec![
            Reference::File {
                id: "gone.md".into(),
                path: PathBuf::from("/nonexistent/gone.md"),
            },
            Reference::Inline {
                id: "pasted".into(),
                text: "usable notes".into(),
            },
        ];

        let assembler = ContextAssembler::new(50_000);
        let messages = assembler.assemble("build it", &[], &references, None).await;

        assert!(messages.iter().any(|m| m.text.contains("could not be read")));
        assert!(messages.iter().any(|m| m.text.contains("usable notes")));
        assert_eq!(messages.last().unwrap().text, "build it");
    }

    #[tokio::test]
    async fn over_budget_assembly_drops_history_before_references() {
        let history = vec![
            ChatTurn::User { text: "h".repeat(400) },
            ChatTurn::User { text: "i".repeat(400) },
        ];
        let references = vec![Reference::Inline {
            id: "notes".into(),
            text: "k".repeat(400),
        }];

        // Room for the fixed fragments plus roughly one variable fragment.
        let budget = SYSTEM_INSTRUCTIONS.chars().count() + SYNTAX_GUIDE.chars().count() + 600;
        let assembler = ContextAssembler::new(budget);
        let messages = assembler.assemble("the ask", &history, &references, None).await;

        let total: usize = messages.iter().map(|m| m.text.chars().count()).sum();
        assert!(total <= budget);
        // The user instruction is always present verbatim.
        assert_eq!(messages.last().unwrap().text, "the ask");
        // History (lower priority) went before the reference did.
        assert!(!messages.iter().any(|m| m.text.contains("hhhh")));
        assert!(messages.iter().any(|m| m.text.contains("kkkk")));
    }

    #[test]
    fn fallback_is_system_plus_user() {
        let messages = fallback_messages("raw ask");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].text.contains("marp: true"));
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].text, "raw ask");
    }
}
