// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slidesmith check` command implementation.
//!
//! Runs a captured model reply through the tolerant parser and reports
//! what the pipeline would have done with it, without touching any
//! session or sandbox state.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;

use slidesmith_core::SlidesmithError;
use slidesmith_parser::rules::{detect_front_matter, FrontMatter};

pub async fn run(file: &Path) -> Result<(), SlidesmithError> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| SlidesmithError::Config(format!("cannot read {}: {e}", file.display())))?;

    let response = slidesmith_parser::parse(&raw);
    let use_color = std::io::stdout().is_terminal();

    let verdict = if response.is_valid {
        if use_color {
            "valid".green().bold().to_string()
        } else {
            "valid".to_string()
        }
    } else if use_color {
        "invalid".red().bold().to_string()
    } else {
        "invalid".to_string()
    };
    println!("structure:    {verdict}");

    let front_matter = match detect_front_matter(&response.content) {
        FrontMatter::Yaml => "yaml block",
        FrontMatter::Directive => "marp directive",
        FrontMatter::Missing => "missing",
    };
    println!("front matter: {front_matter}");
    println!(
        "summary:      {}",
        if response.summary.is_empty() {
            "(none)"
        } else {
            response.summary.as_str()
        }
    );
    println!("chars:        {}", response.content.chars().count());

    if !response.is_valid {
        // Mirror the pipeline: an invalid reply keeps the raw text verbatim.
        eprintln!("note: the pipeline would preserve this reply unmodified");
    }
    Ok(())
}
