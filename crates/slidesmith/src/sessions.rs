// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slidesmith sessions` command implementation.

use std::io::IsTerminal;

use clap::Subcommand;
use colored::Colorize;

use slidesmith_config::model::SlidesmithConfig;
use slidesmith_core::SlidesmithError;
use slidesmith_session::store::SessionStore;

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// List stored sessions, most recently active first.
    List,
    /// Delete expired sessions and their sandbox directories.
    Sweep,
}

pub async fn run(
    config: &SlidesmithConfig,
    command: SessionCommands,
) -> Result<(), SlidesmithError> {
    let store = SessionStore::open(
        &config.session.resolved_db_path(),
        config.session.ttl_days,
    )
    .await?;
    match command {
        SessionCommands::List => list(&store).await,
        SessionCommands::Sweep => sweep(&store).await,
    }
}

async fn list(store: &SessionStore) -> Result<(), SlidesmithError> {
    let sessions = store.list().await?;
    if sessions.is_empty() {
        println!("no sessions");
        return Ok(());
    }

    let use_color = std::io::stdout().is_terminal();
    println!(
        "{:<26} {:<22} {:<22} DOCUMENT",
        "SESSION", "CREATED", "LAST ACTIVE"
    );
    for session in sessions {
        let id = if use_color {
            session.id.cyan().to_string()
        } else {
            session.id.clone()
        };
        println!(
            "{:<26} {:<22} {:<22} {}",
            id,
            session.created_at.format("%Y-%m-%d %H:%M:%S"),
            session.last_active_at.format("%Y-%m-%d %H:%M:%S"),
            session.document_path.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn sweep(store: &SessionStore) -> Result<(), SlidesmithError> {
    let report = store.sweep().await?;
    println!(
        "examined {} session(s), deleted {}",
        report.examined, report.deleted
    );
    if report.sandbox_failures > 0 {
        eprintln!(
            "warning: {} sandbox director(ies) could not be removed",
            report.sandbox_failures
        );
    }
    Ok(())
}
