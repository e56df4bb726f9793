// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tolerant parser turning one raw model reply into a [`DeckResponse`].
//!
//! Model output drifts: sometimes the deck arrives wrapped in a code fence,
//! sometimes between explicit sentinels, sometimes bare. This parser accepts
//! all of them, extracts an optional summary section, validates the result
//! against the Marp structural rules, and normalizes near-miss forms.
//!
//! [`parse`] is total: it never panics and never returns an error. Anything
//! that fails validation comes back as `is_valid = false` with the original
//! raw text preserved so the host can show the user exactly what the model
//! produced.

pub mod rules;

use tracing::debug;

use slidesmith_core::DeckResponse;

use crate::rules::FrontMatter;

/// Sentinel line opening the document content region.
pub const CONTENT_START: &str = "===SLIDES START===";
/// Sentinel line closing the document content region.
pub const CONTENT_END: &str = "===SLIDES END===";
/// Sentinel line opening the summary section.
pub const SUMMARY_START: &str = "===SUMMARY START===";
/// Sentinel line closing the summary section. Optional: a missing closer
/// captures to end of text.
pub const SUMMARY_END: &str = "===SUMMARY END===";

/// Parses one raw model reply into a deck response.
pub fn parse(raw: &str) -> DeckResponse {
    if raw.trim().is_empty() {
        return DeckResponse {
            content: raw.to_string(),
            summary: String::new(),
            is_valid: false,
        };
    }

    // Pull the summary section out first so it is never duplicated into the
    // document, wherever the model placed it relative to fences/sentinels.
    let (remainder, summary) = extract_summary(raw);
    let unwrapped = unwrap_code_fence(remainder.trim());
    let candidate = extract_content(&unwrapped);
    let candidate = candidate.trim();

    let front = rules::detect_front_matter(candidate);
    let body = rules::body_after_front_matter(candidate);

    let is_valid = rules::meets_min_length(candidate)
        && front != FrontMatter::Missing
        && rules::has_slide_delimiter(body);

    if !is_valid {
        debug!(
            len = candidate.len(),
            front_matter = ?front,
            "model reply failed structural validation"
        );
        return DeckResponse {
            content: raw.to_string(),
            summary,
            is_valid: false,
        };
    }

    DeckResponse {
        content: normalize(candidate, front),
        summary,
        is_valid: true,
    }
}

/// Removes the summary section from `text` and returns (remainder, summary).
///
/// The summary runs from the line after [`SUMMARY_START`] to the line before
/// [`SUMMARY_END`], or to end of text when the closer is absent. Residual
/// fence lines inside the section are dropped.
fn extract_summary(text: &str) -> (String, String) {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim() == SUMMARY_START) else {
        return (text.to_string(), String::new());
    };
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim() == SUMMARY_END)
        .map(|i| start + 1 + i);

    let summary = lines[start + 1..end.unwrap_or(lines.len())]
        .iter()
        .filter(|l| !rules::is_fence_line(l))
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    let mut remainder: Vec<&str> = lines[..start].to_vec();
    if let Some(end) = end {
        remainder.extend_from_slice(&lines[end + 1..]);
    }

    (remainder.join("\n"), summary)
}

/// Strips one outer code fence when the whole text is wrapped in it.
///
/// Only fences tagged as the markup dialect (or untagged) are unwrapped, and
/// only the first and last lines are removed, so nested triple-backtick
/// sequences inside the document survive intact.
fn unwrap_code_fence(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return text.to_string();
    }

    let opener = lines[0].trim();
    let tag_ok = opener
        .strip_prefix("```")
        .is_some_and(|tag| matches!(tag.trim(), "" | "marp" | "markdown" | "md"));

    if tag_ok && lines[lines.len() - 1].trim() == "```" {
        return lines[1..lines.len() - 1].join("\n");
    }
    text.to_string()
}

/// Extracts the region between the content sentinels, or the whole text when
/// no opening sentinel is present. Stray sentinel lines are dropped either way.
fn extract_content(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| l.trim() == CONTENT_START);

    let region: &[&str] = match start {
        Some(start) => {
            let end = lines[start + 1..]
                .iter()
                .position(|l| l.trim() == CONTENT_END)
                .map(|i| start + 1 + i)
                .unwrap_or(lines.len());
            &lines[start + 1..end]
        }
        None => &lines,
    };

    region
        .iter()
        .filter(|l| {
            let t = l.trim();
            t != CONTENT_START && t != CONTENT_END
        })
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonicalizes content that validated through a near-miss form.
fn normalize(candidate: &str, front: FrontMatter) -> String {
    // Split the metadata preamble from the body so delimiter synthesis never
    // touches the front matter.
    let (preamble, body) = match front {
        FrontMatter::Yaml => {
            let body = rules::body_after_front_matter(candidate);
            let split = candidate.len() - body.len();
            (&candidate[..split], body)
        }
        FrontMatter::Directive => match candidate.split_once('\n') {
            Some((first, rest)) => (&candidate[..first.len() + 1], rest),
            None => (candidate, ""),
        },
        FrontMatter::Missing => (Default::default(), candidate),
    };

    let body = if rules::has_explicit_delimiter(body) || rules::has_comment_delimiter(body) {
        body.to_string()
    } else {
        rules::insert_heading_delimiters(body)
    };

    let mut content = format!("{preamble}{body}");
    if front == FrontMatter::Directive {
        content = format!("{}{}", rules::DEFAULT_FRONT_MATTER, content);
    }
    content
}
