// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock rendering workspace backed by a temporary directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use slidesmith_core::{DeckHandle, DeckWorkspace, SlidesmithError};

/// A `DeckWorkspace` that materializes decks under a test-owned root
/// directory, keyed by session id like the real sandbox manager.
pub struct MockWorkspace {
    root: PathBuf,
    fail_materialize: AtomicBool,
    materialized: Arc<Mutex<Vec<String>>>,
}

impl MockWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fail_materialize: AtomicBool::new(false),
            materialized: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes subsequent `materialize` calls fail, for sandbox-error tests.
    pub fn fail_next_materialize(&self) {
        self.fail_materialize.store(true, Ordering::SeqCst);
    }

    /// Session ids materialized so far, in call order.
    pub async fn materialized_sessions(&self) -> Vec<String> {
        self.materialized.lock().await.clone()
    }
}

#[async_trait]
impl DeckWorkspace for MockWorkspace {
    async fn materialize(
        &self,
        session_id: &str,
        document: &str,
    ) -> Result<DeckHandle, SlidesmithError> {
        if self.fail_materialize.swap(false, Ordering::SeqCst) {
            return Err(SlidesmithError::Workspace {
                message: "mock: sandbox unavailable".to_string(),
                source: None,
            });
        }

        let project_dir = self.root.join(session_id);
        tokio::fs::create_dir_all(&project_dir)
            .await
            .map_err(|e| SlidesmithError::Workspace {
                message: format!("failed to create sandbox: {e}"),
                source: Some(Box::new(e)),
            })?;

        let document_path = project_dir.join("deck.md");
        tokio::fs::write(&document_path, document)
            .await
            .map_err(|e| SlidesmithError::Workspace {
                message: format!("failed to write deck: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.materialized.lock().await.push(session_id.to_string());
        Ok(DeckHandle {
            document_path,
            project_dir,
        })
    }

    async fn preview(&self, handle: &DeckHandle) -> Result<String, SlidesmithError> {
        Ok(format!("http://localhost:8080/{}", handle.project_dir.display()))
    }

    async fn export(
        &self,
        handle: &DeckHandle,
        destination: &Path,
    ) -> Result<PathBuf, SlidesmithError> {
        tokio::fs::copy(&handle.document_path, destination)
            .await
            .map_err(|e| SlidesmithError::Workspace {
                message: format!("failed to export: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(destination.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn materialize_reuses_per_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = MockWorkspace::new(dir.path());

        let first = workspace.materialize("abc123", "# v1").await.unwrap();
        let second = workspace.materialize("abc123", "# v2").await.unwrap();

        assert_eq!(first.project_dir, second.project_dir);
        let content = tokio::fs::read_to_string(&second.document_path).await.unwrap();
        assert_eq!(content, "# v2");
        assert_eq!(workspace.materialized_sessions().await, vec!["abc123", "abc123"]);
    }

    #[tokio::test]
    async fn scripted_failure_is_a_workspace_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = MockWorkspace::new(dir.path());
        workspace.fail_next_materialize();

        let err = workspace.materialize("abc123", "# doc").await.err().unwrap();
        assert!(matches!(err, SlidesmithError::Workspace { .. }));
        // The failure is one-shot.
        assert!(workspace.materialize("abc123", "# doc").await.is_ok());
    }
}
