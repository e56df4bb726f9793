// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Slidesmith deck generator.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Slidesmith workspace. The session store,
//! context assembler, response parser, and orchestrator all speak these types.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SlidesmithError;
pub use traits::{DeckWorkspace, ModelAdapter};
pub use types::{
    ChatTurn, DeckHandle, DeckResponse, MessageRole, ModelMessage, ModelRequest,
    Reference, StreamChunk, StreamEventType, TokenUsage, GENERATOR_PARTICIPANT,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = SlidesmithError::Config("bad toml".into());
        let _storage = SlidesmithError::Storage {
            source: Box::new(std::io::Error::other("db")),
        };
        let _missing = SlidesmithError::MissingModel;
        let _denied = SlidesmithError::PermissionDenied("no access".into());
        let _blocked = SlidesmithError::Blocked("policy".into());
        let _unsupported = SlidesmithError::ModelNotSupported {
            model: "gpt-x".into(),
        };
        let _transport = SlidesmithError::Transport {
            message: "io".into(),
            source: None,
        };
        let _cancelled = SlidesmithError::Cancelled;
        let _workspace = SlidesmithError::Workspace {
            message: "mkdir failed".into(),
            source: None,
        };
        let _internal = SlidesmithError::Internal("bug".into());
    }

    #[test]
    fn cancellation_is_not_an_error_category() {
        assert!(SlidesmithError::Cancelled.is_cancellation());
        assert!(!SlidesmithError::MissingModel.is_cancellation());
    }

    #[test]
    fn error_messages_are_user_presentable() {
        assert_eq!(
            SlidesmithError::MissingModel.to_string(),
            "no language model is available for this request"
        );
        assert_eq!(
            SlidesmithError::ModelNotSupported {
                model: "gpt-x".into()
            }
            .to_string(),
            "model not supported: gpt-x"
        );
        assert_eq!(SlidesmithError::Cancelled.to_string(), "operation cancelled");
    }

    #[test]
    fn trait_objects_are_usable() {
        fn _assert_model<T: ModelAdapter>() {}
        fn _assert_workspace<T: DeckWorkspace>() {}
        fn _object_safe(_m: &dyn ModelAdapter, _w: &dyn DeckWorkspace) {}
    }
}
