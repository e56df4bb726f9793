// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation orchestrator for the Slidesmith deck pipeline.
//!
//! The [`GenerationOrchestrator`] drives one chat turn end to end:
//! - Resolves or creates the conversation's session
//! - Assembles the model prompt within the input budget
//! - Streams the model response, honoring cancellation
//! - Parses the accumulated reply into a deck document
//! - Materializes valid decks into the rendering workspace

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use slidesmith_config::model::SlidesmithConfig;
use slidesmith_context::ContextAssembler;
use slidesmith_core::{
    ChatTurn, DeckResponse, DeckWorkspace, ModelAdapter, ModelRequest, Reference,
    SlidesmithError, StreamEventType, TokenUsage,
};
use slidesmith_session::marker;
use slidesmith_session::store::{Session, SessionStore};

/// One chat turn's worth of generation input.
pub struct GenerationRequest {
    /// The user's instruction for this turn.
    pub prompt: String,
    /// Prior conversation turns, oldest first, as the host presents them.
    pub history: Vec<ChatTurn>,
    /// Attachments and selections the user included with the prompt.
    pub references: Vec<Reference>,
    /// Host-provided model transport. Absent when the host has no model
    /// configured, which is a fatal condition for this turn.
    pub model: Option<Arc<dyn ModelAdapter>>,
}

/// Follow-up affordance the host can render as a clickable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAction {
    /// Open the materialized document directly.
    OpenDocument,
    /// Start (or reuse) a live local preview.
    Preview,
    /// Export the deck to a portable format.
    Export,
}

/// Result of a completed generation turn.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Chat reply to surface to the user, marker included where required.
    pub reply: String,
    /// Parsed deck response, valid or not.
    pub response: DeckResponse,
    /// Session this turn ran under.
    pub session_id: String,
    /// Whether this turn created the session.
    pub is_new_session: bool,
    /// Actions the host should offer for this turn. Empty when no document
    /// was materialized.
    pub actions: Vec<FollowUpAction>,
    /// Path of the materialized document, when the deck was valid.
    pub document_path: Option<PathBuf>,
    /// Token usage reported by the model, when the stream carried it.
    pub usage: Option<TokenUsage>,
}

/// Coordinates session store, context assembly, model transport, parser,
/// and rendering workspace for each generation turn.
pub struct GenerationOrchestrator {
    store: Arc<SessionStore>,
    workspace: Arc<dyn DeckWorkspace>,
    config: SlidesmithConfig,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        workspace: Arc<dyn DeckWorkspace>,
        config: SlidesmithConfig,
    ) -> Self {
        Self {
            store,
            workspace,
            config,
        }
    }

    /// Runs one generation turn.
    ///
    /// Fatal conditions (missing model, transport permission errors,
    /// cancellation) surface as `Err`. A structurally invalid model reply is
    /// NOT an error: it produces an outcome with `response.is_valid == false`
    /// and the raw output preserved in the reply.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome, SlidesmithError> {
        let model = request.model.as_ref().ok_or(SlidesmithError::MissingModel)?;

        let (session, is_new_session) = self.resolve_session(&request.history).await?;
        info!(
            session_id = %session.id,
            is_new = is_new_session,
            "starting generation turn"
        );

        let budget = self
            .config
            .context
            .input_budget_chars
            .min(model.input_budget_chars());
        let prior = if is_new_session { None } else { Some(&session) };
        let messages = ContextAssembler::new(budget)
            .assemble(&request.prompt, &request.history, &request.references, prior)
            .await;

        let (raw, usage) = self
            .invoke_with_fallback(model.as_ref(), messages, &cancel)
            .await?;

        if cancel.is_cancelled() {
            return Err(SlidesmithError::Cancelled);
        }

        let response = slidesmith_parser::parse(&raw);
        if response.is_valid {
            self.finish_valid(&session, is_new_session, response, usage)
                .await
        } else {
            warn!(session_id = %session.id, "model reply failed structural validation");
            Ok(self.finish_invalid(&session, is_new_session, response, usage))
        }
    }

    /// Recovers the session referenced by the conversation history, or
    /// creates a fresh one when no marker resolves to a live session.
    async fn resolve_session(
        &self,
        history: &[ChatTurn],
    ) -> Result<(Session, bool), SlidesmithError> {
        if let Some(id) = marker::decode_from_history(history) {
            match self.store.get(&id).await? {
                Some(session) => {
                    debug!(session_id = %id, "resumed session from history marker");
                    return Ok((session, false));
                }
                None => {
                    info!(session_id = %id, "history marker points at an expired or unknown session, starting fresh");
                }
            }
        }
        let session = self.store.create().await?;
        Ok((session, true))
    }

    /// Invokes the model, retrying once on the fallback model when the
    /// transport rejects the primary as unsupported.
    async fn invoke_with_fallback(
        &self,
        model: &dyn ModelAdapter,
        messages: Vec<slidesmith_core::ModelMessage>,
        cancel: &CancellationToken,
    ) -> Result<(String, Option<TokenUsage>), SlidesmithError> {
        let primary = model.model_id().to_string();
        let request = ModelRequest {
            model: primary.clone(),
            messages: messages.clone(),
            max_tokens: self.config.generation.max_tokens,
        };
        match self.invoke(model, request, cancel).await {
            Err(SlidesmithError::ModelNotSupported { model: rejected })
                if primary != self.config.generation.fallback_model =>
            {
                let fallback = self.config.generation.fallback_model.clone();
                warn!(
                    rejected = %rejected,
                    fallback = %fallback,
                    "model not supported, retrying on fallback"
                );
                let retry = ModelRequest {
                    model: fallback,
                    messages,
                    max_tokens: self.config.generation.max_tokens,
                };
                self.invoke(model, retry, cancel).await
            }
            other => other,
        }
    }

    /// Streams one model invocation to completion, accumulating delta text.
    async fn invoke(
        &self,
        model: &dyn ModelAdapter,
        request: ModelRequest,
        cancel: &CancellationToken,
    ) -> Result<(String, Option<TokenUsage>), SlidesmithError> {
        let mut stream = model.stream(request).await?;
        let mut accumulated = String::new();
        let mut usage = None;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SlidesmithError::Cancelled),
                chunk = stream.next() => match chunk {
                    None => break,
                    Some(Err(e)) => return Err(e),
                    Some(Ok(chunk)) => {
                        match chunk.event {
                            StreamEventType::Delta => {
                                if let Some(text) = chunk.text {
                                    accumulated.push_str(&text);
                                }
                            }
                            StreamEventType::Stop => {
                                if chunk.usage.is_some() {
                                    usage = chunk.usage;
                                }
                            }
                            StreamEventType::Start => {}
                        }
                    }
                },
            }
        }
        Ok((accumulated, usage))
    }

    /// Materializes a valid deck and records the session's artifact paths.
    async fn finish_valid(
        &self,
        session: &Session,
        is_new_session: bool,
        response: DeckResponse,
        usage: Option<TokenUsage>,
    ) -> Result<GenerationOutcome, SlidesmithError> {
        let handle = self
            .workspace
            .materialize(&session.id, &response.content)
            .await
            .map_err(|e| match e {
                already @ SlidesmithError::Workspace { .. } => already,
                other => SlidesmithError::Workspace {
                    message: format!("failed to materialize deck: {other}"),
                    source: Some(Box::new(other)),
                },
            })?;

        // The deck exists on disk at this point. A bookkeeping failure in the
        // store downgrades session continuity but must not fail the turn.
        let doc = handle.document_path.to_string_lossy();
        if let Err(e) = self.store.update_document_path(&session.id, &doc).await {
            warn!(session_id = %session.id, error = %e, "failed to record document path");
        }
        let proj = handle.project_dir.to_string_lossy();
        if let Err(e) = self.store.update_project_path(&session.id, &proj).await {
            warn!(session_id = %session.id, error = %e, "failed to record project path");
        }

        let mut reply = if response.summary.is_empty() {
            "Your deck is ready.".to_string()
        } else {
            response.summary.clone()
        };
        if is_new_session {
            reply.push_str("\n\n");
            reply.push_str(&marker::encode(&session.id));
        }

        info!(
            session_id = %session.id,
            document = %doc,
            "deck generated and materialized"
        );
        Ok(GenerationOutcome {
            reply,
            response,
            session_id: session.id.clone(),
            is_new_session,
            actions: vec![
                FollowUpAction::OpenDocument,
                FollowUpAction::Preview,
                FollowUpAction::Export,
            ],
            document_path: Some(handle.document_path),
            usage,
        })
    }

    /// Builds the turn outcome for a reply that failed validation.
    ///
    /// Nothing is written to the workspace, but the marker is always
    /// emitted so a follow-up turn can still resume this session and the
    /// raw output is preserved in the reply so the user loses nothing.
    fn finish_invalid(
        &self,
        session: &Session,
        is_new_session: bool,
        response: DeckResponse,
        usage: Option<TokenUsage>,
    ) -> GenerationOutcome {
        let reply = format!(
            "I couldn't turn that response into a well-formed slide deck, so \
             nothing was written. The raw output is preserved below:\n\n{}\n\n{}",
            response.content,
            marker::encode(&session.id)
        );
        GenerationOutcome {
            reply,
            response,
            session_id: session.id.clone(),
            is_new_session,
            actions: Vec::new(),
            document_path: None,
            usage,
        }
    }
}
