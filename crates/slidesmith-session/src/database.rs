// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use slidesmith_core::SlidesmithError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Converts a tokio-rusqlite error into the shared storage error category.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> SlidesmithError {
    SlidesmithError::Storage {
        source: Box::new(e),
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> SlidesmithError {
    SlidesmithError::Storage {
        source: Box::new(e),
    }
}

/// An open session database: a single serialized connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` and runs pending migrations.
    pub async fn open(path: &Path) -> Result<Self, SlidesmithError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(storage_err)?;
        }

        let conn = Connection::open(path).await.map_err(storage_err)?;
        conn.call(|c| -> Result<(), rusqlite::Error> {
            c.pragma_update(None, "journal_mode", "WAL")?;
            c.pragma_update(None, "synchronous", "NORMAL")?;
            c.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Self::migrate(&conn).await?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database with migrations applied. Test-oriented.
    pub async fn open_in_memory() -> Result<Self, SlidesmithError> {
        let conn = Connection::open_in_memory().await.map_err(storage_err)?;
        Self::migrate(&conn).await?;
        Ok(Self { conn })
    }

    async fn migrate(conn: &Connection) -> Result<(), SlidesmithError> {
        conn.call(|c| -> Result<(), refinery::Error> { migrations::run_migrations(c) })
            .await
            .map_err(storage_err)
    }

    /// Returns the serialized connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
