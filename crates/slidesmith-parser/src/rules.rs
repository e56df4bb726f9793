// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural validation rules for candidate deck content.
//!
//! Each rule is an independently testable predicate over semi-structured
//! text. Regex is deliberately the tool here: the model's output is markdown,
//! not a grammar worth a full parser.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum trimmed length for a candidate document to be considered a deck.
pub const MIN_DOCUMENT_CHARS: usize = 40;

/// Metadata block prepended when content validated through the directive
/// comment form rather than a YAML front-matter block.
pub const DEFAULT_FRONT_MATTER: &str = "---\nmarp: true\ntheme: default\n---\n\n";

static FENCE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*\s*$").expect("fence regex"));

static EXPLICIT_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*---\s*$").expect("delimiter regex"));

static COMMENT_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*<!--\s*slide\s*-->\s*$").expect("slide comment regex"));

static TOP_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+\S").expect("heading regex"));

static MARP_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!--\s*marp\s*:").expect("marp directive regex"));

/// How (and whether) the document opens with a metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatter {
    /// A `---` delimited YAML block at the very start.
    Yaml,
    /// A `<!-- marp: ... -->` directive comment at the very start. Qualifies
    /// for validation but gets a canonical block synthesized on normalization.
    Directive,
    Missing,
}

/// True when a line is a bare or language-tagged triple-backtick fence.
pub fn is_fence_line(line: &str) -> bool {
    FENCE_LINE_RE.is_match(line.trim())
}

/// Detects the metadata block form at the start of `text`.
pub fn detect_front_matter(text: &str) -> FrontMatter {
    let trimmed = text.trim_start();
    let mut lines = trimmed.lines();
    match lines.next() {
        Some(first) if first.trim() == "---" => {
            // A YAML block needs a closing --- line.
            if lines.any(|l| l.trim() == "---") {
                FrontMatter::Yaml
            } else {
                FrontMatter::Missing
            }
        }
        Some(first) if MARP_DIRECTIVE_RE.is_match(first.trim_start()) => FrontMatter::Directive,
        _ => FrontMatter::Missing,
    }
}

/// Returns the document body with a leading YAML front-matter block removed,
/// so its `---` delimiters are not mistaken for slide separators.
pub fn body_after_front_matter(text: &str) -> &str {
    let trimmed = text.trim_start();
    if detect_front_matter(trimmed) != FrontMatter::Yaml {
        return text;
    }

    // Skip the opening --- line, then everything through the closing one.
    let after_open = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => return text,
    };
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        offset += line.len();
        if line.trim() == "---" {
            return &after_open[offset..];
        }
    }
    // Closing line was the last line (no trailing newline).
    if after_open.lines().last().map(str::trim) == Some("---") {
        return "";
    }
    text
}

/// True when the body contains a bare `---` delimiter line.
pub fn has_explicit_delimiter(body: &str) -> bool {
    EXPLICIT_DELIMITER_RE.is_match(body)
}

/// True when the body contains a `<!-- slide -->` comment marker.
pub fn has_comment_delimiter(body: &str) -> bool {
    COMMENT_DELIMITER_RE.is_match(body)
}

/// Number of top-level (`# `) headings in the body.
pub fn top_heading_count(body: &str) -> usize {
    TOP_HEADING_RE.find_iter(body).count()
}

/// True when the body exhibits at least one slide boundary under any of the
/// recognized conventions: a bare delimiter line, a comment-style slide
/// marker, or two or more top-level headings (implicit slides).
pub fn has_slide_delimiter(body: &str) -> bool {
    has_explicit_delimiter(body) || has_comment_delimiter(body) || top_heading_count(body) >= 2
}

/// True when the trimmed candidate meets the minimum document length.
pub fn meets_min_length(text: &str) -> bool {
    text.trim().chars().count() >= MIN_DOCUMENT_CHARS
}

/// Inserts a `---` separator before each top-level heading that follows
/// content, never before the very first heading.
///
/// Used only when no explicit or comment delimiter was found and slide
/// boundaries are implied by headings.
pub fn insert_heading_delimiters(body: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut seen_content = false;

    for line in body.lines() {
        if TOP_HEADING_RE.is_match(line) && seen_content {
            if out.last().is_some_and(|l| !l.trim().is_empty()) {
                out.push(String::new());
            }
            out.push("---".to_string());
            out.push(String::new());
        }
        if !line.trim().is_empty() {
            seen_content = true;
        }
        out.push(line.to_string());
    }

    let mut result = out.join("\n");
    if body.ends_with('\n') {
        result.push('\n');
    }
    result
}
