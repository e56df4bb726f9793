// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of user-attached references into labeled fragments.
//!
//! A single unreadable reference never aborts assembly: it renders as a
//! labeled error block and the rest of the prompt is built around it.

use tracing::warn;

use slidesmith_core::{MessageRole, Reference};

use crate::fragment::ContextFragment;

/// Renders one reference into a fragment at the given priority.
pub async fn render_reference(reference: &Reference, priority: u8) -> ContextFragment {
    let label = format!("[reference: {}]", reference.id());

    match reference {
        Reference::Inline { text, .. } => {
            ContextFragment::new(MessageRole::User, priority, label, text.clone())
        }
        Reference::File { path, .. } => match tokio::fs::read_to_string(path).await {
            Ok(content) => ContextFragment::fenced(MessageRole::User, priority, label, content),
            Err(e) => error_fragment(reference, priority, label, &e),
        },
        Reference::Selection {
            path,
            start_line,
            end_line,
            ..
        } => match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let excerpt = slice_lines(&content, *start_line, *end_line);
                ContextFragment::fenced(MessageRole::User, priority, label, excerpt)
            }
            Err(e) => error_fragment(reference, priority, label, &e),
        },
    }
}

fn error_fragment(
    reference: &Reference,
    priority: u8,
    label: String,
    error: &std::io::Error,
) -> ContextFragment {
    warn!(reference = reference.id(), error = %error, "reference could not be read");
    ContextFragment::new(
        MessageRole::User,
        priority,
        label,
        format!("(this reference could not be read: {error})"),
    )
}

/// Extracts an inclusive 1-based line range, clamped to the file's bounds.
fn slice_lines(content: &str, start_line: u32, end_line: u32) -> String {
    let start = (start_line.max(1) as usize) - 1;
    let end = end_line.max(start_line) as usize;
    content
        .lines()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn inline_reference_renders_verbatim() {
        let reference = Reference::Inline {
            id: "pasted".into(),
            text: "speaker notes".into(),
        };
        let frag = render_reference(&reference, 60).await;
        assert_eq!(frag.label, "[reference: pasted]");
        assert_eq!(frag.body, "speaker notes");
        assert!(!frag.fenced);
    }

    #[tokio::test]
    async fn file_reference_renders_fenced_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        tokio::fs::write(&path, "line one\nline two").await.unwrap();

        let reference = Reference::File {
            id: "notes.md".into(),
            path,
        };
        let frag = render_reference(&reference, 60).await;
        assert!(frag.fenced);
        assert_eq!(frag.body, "line one\nline two");
    }

    #[tokio::test]
    async fn selection_reference_renders_only_the_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        tokio::fs::write(&path, "one\ntwo\nthree\nfour\nfive")
            .await
            .unwrap();

        let reference = Reference::Selection {
            id: "notes.md:2-4".into(),
            path,
            start_line: 2,
            end_line: 4,
        };
        let frag = render_reference(&reference, 60).await;
        assert_eq!(frag.body, "two\nthree\nfour");
    }

    #[tokio::test]
    async fn selection_range_is_clamped_to_file_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.md");
        tokio::fs::write(&path, "only\ntwo lines").await.unwrap();

        let reference = Reference::Selection {
            id: "short.md:1-99".into(),
            path,
            start_line: 1,
            end_line: 99,
        };
        let frag = render_reference(&reference, 60).await;
        assert_eq!(frag.body, "only\ntwo lines");
    }

    #[tokio::test]
    async fn unreadable_reference_becomes_labeled_error_block() {
        let reference = Reference::File {
            id: "gone.md".into(),
            path: PathBuf::from("/nonexistent/gone.md"),
        };
        let frag = render_reference(&reference, 60).await;
        assert_eq!(frag.label, "[reference: gone.md]");
        assert!(frag.body.contains("could not be read"));
        assert!(!frag.fenced);
    }
}
