// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model transport trait for the host-provided language model.
//!
//! The chat host owns the actual transport (authentication, wire protocol,
//! its error taxonomy). Adapters translate transport failures into the
//! [`SlidesmithError`] categories before they cross this boundary.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::SlidesmithError;
use crate::types::{ModelRequest, StreamChunk};

/// Boxed stream of incremental model output.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<StreamChunk, SlidesmithError>> + Send>>;

/// Adapter over the host's language model invocation.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Default model identifier this adapter invokes.
    fn model_id(&self) -> &str;

    /// Maximum input size the transport accepts, in characters.
    ///
    /// The context assembler never produces a request larger than this.
    fn input_budget_chars(&self) -> usize;

    /// Sends a request and returns a stream of incremental text chunks.
    async fn stream(&self, request: ModelRequest) -> Result<ChunkStream, SlidesmithError>;
}
