// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model transport for deterministic testing.
//!
//! `MockModel` implements `ModelAdapter` with pre-scripted replies, enabling
//! fast, CI-runnable tests without external API calls. Replies are popped
//! from a FIFO queue; an empty queue yields a default text reply.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use tokio::sync::Mutex;

use slidesmith_core::{
    ModelAdapter, ModelRequest, SlidesmithError, StreamChunk, StreamEventType, TokenUsage,
};
use slidesmith_core::traits::model::ChunkStream;

/// One scripted transport behavior.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream the text as several delta chunks, then stop.
    Text(String),
    /// Fail with `ModelNotSupported` for the requested model.
    Unsupported,
    /// Fail with `PermissionDenied`.
    Denied,
    /// Fail with `Blocked`.
    Blocked,
    /// Emit one delta then never produce another chunk. For cancellation tests.
    Stall(String),
}

/// A mock transport that returns pre-scripted replies in order.
pub struct MockModel {
    model_id: String,
    budget_chars: usize,
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl MockModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            budget_chars: 100_000,
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_replies(model_id: impl Into<String>, replies: Vec<ScriptedReply>) -> Self {
        let model = Self::new(model_id);
        {
            let queue = model.replies.clone();
            let mut replies = VecDeque::from(replies);
            if let Ok(mut guard) = queue.try_lock() {
                guard.append(&mut replies);
            }
        }
        model
    }

    /// Overrides the advertised input budget.
    pub fn with_budget(mut self, budget_chars: usize) -> Self {
        self.budget_chars = budget_chars;
        self
    }

    /// Appends a scripted reply to the queue.
    pub async fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests the adapter has received, in order.
    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> ScriptedReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Text("mock reply".to_string()))
    }
}

#[async_trait]
impl ModelAdapter for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn input_budget_chars(&self) -> usize {
        self.budget_chars
    }

    async fn stream(&self, request: ModelRequest) -> Result<ChunkStream, SlidesmithError> {
        let requested_model = request.model.clone();
        self.requests.lock().await.push(request);

        match self.next_reply().await {
            ScriptedReply::Text(text) => Ok(text_stream(&text)),
            ScriptedReply::Unsupported => Err(SlidesmithError::ModelNotSupported {
                model: requested_model,
            }),
            ScriptedReply::Denied => Err(SlidesmithError::PermissionDenied(
                "mock: access denied".to_string(),
            )),
            ScriptedReply::Blocked => Err(SlidesmithError::Blocked(
                "mock: blocked by policy".to_string(),
            )),
            ScriptedReply::Stall(first_delta) => {
                let opening = stream::iter(vec![
                    Ok(StreamChunk {
                        event: StreamEventType::Start,
                        text: None,
                        usage: None,
                    }),
                    Ok(StreamChunk {
                        event: StreamEventType::Delta,
                        text: Some(first_delta),
                        usage: None,
                    }),
                ]);
                Ok(Box::pin(opening.chain(stream::pending())))
            }
        }
    }
}

/// Produces a realistic event sequence: Start, several Deltas, Stop + usage.
fn text_stream(text: &str) -> ChunkStream {
    let mut chunks: Vec<Result<StreamChunk, SlidesmithError>> = vec![Ok(StreamChunk {
        event: StreamEventType::Start,
        text: None,
        usage: None,
    })];

    for piece in text
        .as_bytes()
        .chunks(16)
        .map(|b| String::from_utf8_lossy(b).into_owned())
    {
        chunks.push(Ok(StreamChunk {
            event: StreamEventType::Delta,
            text: Some(piece),
            usage: None,
        }));
    }

    chunks.push(Ok(StreamChunk {
        event: StreamEventType::Stop,
        text: None,
        usage: Some(TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        }),
    }));

    Box::pin(stream::iter(chunks))
}
