// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable session store with TTL-based eviction.
//!
//! One row per session id. Sessions are kept alive by use: every successful
//! lookup and every path update refreshes `last_active_at`. The sweep deletes
//! records past the retention window and best-effort removes each deleted
//! session's rendering sandbox.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use tracing::{debug, info, warn};

use slidesmith_core::SlidesmithError;

use crate::database::{map_tr_err, Database};
use crate::marker;

/// One logical multi-turn conversation about one presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque 24-hex identifier. Immutable once created.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// Where the last generated document was materialized.
    pub document_path: Option<String>,
    /// Root of the session's rendering sandbox.
    pub project_path: Option<String>,
    /// Last chosen destination for an exported artifact.
    pub export_path: Option<String>,
}

/// Which optional path column an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathField {
    Document,
    Project,
    Export,
}

impl PathField {
    fn column(self) -> &'static str {
        match self {
            PathField::Document => "document_path",
            PathField::Project => "project_path",
            PathField::Export => "export_path",
        }
    }
}

/// Result of one TTL sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sessions examined.
    pub examined: usize,
    /// Session records deleted.
    pub deleted: usize,
    /// Sandbox directories that could not be removed (logged, not fatal).
    pub sandbox_failures: usize,
}

/// TTL-evicting session store over a serialized SQLite connection.
pub struct SessionStore {
    db: Database,
    ttl: Duration,
}

impl SessionStore {
    /// Opens the store at `path`, creating the database if needed.
    pub async fn open(path: &Path, ttl_days: u64) -> Result<Self, SlidesmithError> {
        let db = Database::open(path).await?;
        Ok(Self::with_database(db, ttl_days))
    }

    /// Opens an in-memory store. Test-oriented.
    pub async fn open_in_memory(ttl_days: u64) -> Result<Self, SlidesmithError> {
        let db = Database::open_in_memory().await?;
        Ok(Self::with_database(db, ttl_days))
    }

    fn with_database(db: Database, ttl_days: u64) -> Self {
        Self {
            db,
            ttl: Duration::days(ttl_days as i64),
        }
    }

    /// Allocates and persists a fresh session.
    pub async fn create(&self) -> Result<Session, SlidesmithError> {
        let now = Utc::now();
        let session = Session {
            id: marker::generate_session_id(),
            created_at: now,
            last_active_at: now,
            document_path: None,
            project_path: None,
            export_path: None,
        };

        let row = session.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sessions
                     (id, created_at, last_active_at, document_path, project_path, export_path)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        row.id,
                        row.created_at.to_rfc3339(),
                        row.last_active_at.to_rfc3339(),
                        row.document_path,
                        row.project_path,
                        row.export_path,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        info!(session_id = session.id.as_str(), "created session");
        Ok(session)
    }

    /// Looks up a session by id.
    ///
    /// Returns `None` for unknown ids and for sessions past the retention
    /// window (they are logically gone even before the next sweep). A hit
    /// refreshes `last_active_at`: sessions stay alive by use.
    pub async fn get(&self, id: &str) -> Result<Option<Session>, SlidesmithError> {
        let Some(mut session) = self.fetch(id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if now - session.last_active_at > self.ttl {
            debug!(session_id = id, "session past retention window");
            return Ok(None);
        }

        self.touch(id, now).await?;
        session.last_active_at = now;
        Ok(Some(session))
    }

    /// Records a path on the session and refreshes `last_active_at`.
    ///
    /// An unknown id is a logged no-op, never an error: a stale path update
    /// must not abort an otherwise-successful generation.
    pub async fn update_path(
        &self,
        id: &str,
        field: PathField,
        path: &str,
    ) -> Result<(), SlidesmithError> {
        let sql = format!(
            "UPDATE sessions SET {} = ?1, last_active_at = ?2 WHERE id = ?3",
            field.column()
        );
        let id_owned = id.to_string();
        let path_owned = path.to_string();
        let now = Utc::now().to_rfc3339();

        let changed = self
            .db
            .connection()
            .call(move |conn| {
                let n = conn.execute(&sql, params![path_owned, now, id_owned])?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;

        if changed == 0 {
            warn!(session_id = id, field = field.column(), "path update for unknown session");
        }
        Ok(())
    }

    /// Convenience wrapper for [`PathField::Document`].
    pub async fn update_document_path(&self, id: &str, path: &str) -> Result<(), SlidesmithError> {
        self.update_path(id, PathField::Document, path).await
    }

    /// Convenience wrapper for [`PathField::Project`].
    pub async fn update_project_path(&self, id: &str, path: &str) -> Result<(), SlidesmithError> {
        self.update_path(id, PathField::Project, path).await
    }

    /// Convenience wrapper for [`PathField::Export`].
    pub async fn update_export_path(&self, id: &str, path: &str) -> Result<(), SlidesmithError> {
        self.update_path(id, PathField::Export, path).await
    }

    /// Lists all sessions, most recently active first.
    pub async fn list(&self) -> Result<Vec<Session>, SlidesmithError> {
        self.db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, created_at, last_active_at, document_path, project_path, export_path
                     FROM sessions ORDER BY last_active_at DESC",
                )?;
                let rows = stmt.query_map([], row_to_session)?;
                let mut sessions = Vec::new();
                for row in rows {
                    sessions.push(row?);
                }
                Ok(sessions)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Deletes all sessions past the retention window.
    ///
    /// Each deleted session's sandbox directory is removed best-effort;
    /// a failed directory removal is logged and never blocks deletion of the
    /// session record.
    pub async fn sweep(&self) -> Result<SweepReport, SlidesmithError> {
        let sessions = self.list().await?;
        let now = Utc::now();
        let ttl = self.ttl;

        let mut report = SweepReport {
            examined: sessions.len(),
            ..Default::default()
        };

        for session in sessions {
            if now - session.last_active_at <= ttl {
                continue;
            }

            let id = session.id.clone();
            self.db
                .connection()
                .call(move |conn| {
                    conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            report.deleted += 1;

            if let Some(project) = &session.project_path {
                if let Err(e) = tokio::fs::remove_dir_all(project).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(
                            session_id = session.id.as_str(),
                            path = project.as_str(),
                            error = %e,
                            "failed to remove session sandbox"
                        );
                        report.sandbox_failures += 1;
                    }
                }
            }

            debug!(session_id = session.id.as_str(), "swept expired session");
        }

        if report.deleted > 0 {
            info!(
                examined = report.examined,
                deleted = report.deleted,
                sandbox_failures = report.sandbox_failures,
                "session sweep complete"
            );
        }
        Ok(report)
    }

    /// Fetches a row without TTL filtering or keep-alive. Internal.
    async fn fetch(&self, id: &str) -> Result<Option<Session>, SlidesmithError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, created_at, last_active_at, document_path, project_path, export_path
                     FROM sessions WHERE id = ?1",
                )?;
                let result = stmt.query_row(params![id], row_to_session);
                match result {
                    Ok(session) => Ok(Some(session)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn touch(&self, id: &str, now: DateTime<Utc>) -> Result<(), SlidesmithError> {
        let id = id.to_string();
        let now = now.to_rfc3339();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE sessions SET last_active_at = ?1 WHERE id = ?2",
                    params![now, id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Backdates `last_active_at`. Test fixture hook for TTL coverage.
    #[doc(hidden)]
    pub async fn set_last_active(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), SlidesmithError> {
        self.touch(id, at).await
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        created_at: parse_timestamp(&row.get::<_, String>(1)?),
        last_active_at: parse_timestamp(&row.get::<_, String>(2)?),
        document_path: row.get(3)?,
        project_path: row.get(4)?,
        export_path: row.get(5)?,
    })
}

/// Parses a stored RFC-3339 timestamp, falling back to the UNIX epoch.
///
/// A corrupt timestamp makes the session immediately sweep-eligible instead
/// of wedging the store.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!(raw = s, error = %e, "unparseable session timestamp, treating as epoch");
            DateTime::<Utc>::UNIX_EPOCH
        })
}
