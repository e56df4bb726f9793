// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestrator tests against the mock model and workspace.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use slidesmith_agent::{FollowUpAction, GenerationOrchestrator, GenerationRequest};
use slidesmith_config::model::SlidesmithConfig;
use slidesmith_core::{ChatTurn, SlidesmithError, GENERATOR_PARTICIPANT};
use slidesmith_session::marker;
use slidesmith_session::store::SessionStore;
use slidesmith_test_utils::{MockModel, MockWorkspace, ScriptedReply};

const VALID_REPLY: &str = r#"===SLIDES START===
---
marp: true
theme: default
---

# Quarterly Review

Revenue grew twelve percent quarter over quarter.

---

# Outlook

Headcount stays flat while we ship the new pipeline.
===SLIDES END===
===SUMMARY START===
Created a two-slide quarterly review deck.
===SUMMARY END==="#;

struct Harness {
    orchestrator: GenerationOrchestrator,
    store: Arc<SessionStore>,
    workspace: Arc<MockWorkspace>,
    root: tempfile::TempDir,
}

async fn harness() -> Harness {
    let root = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::open_in_memory(30).await.unwrap());
    let workspace = Arc::new(MockWorkspace::new(root.path()));
    let orchestrator = GenerationOrchestrator::new(
        Arc::clone(&store),
        workspace.clone(),
        SlidesmithConfig::default(),
    );
    Harness {
        orchestrator,
        store,
        workspace,
        root,
    }
}

fn request(model: Arc<MockModel>) -> GenerationRequest {
    GenerationRequest {
        prompt: "Make a deck about the quarterly review".to_string(),
        history: Vec::new(),
        references: Vec::new(),
        model: Some(model),
    }
}

#[tokio::test]
async fn valid_deck_is_materialized_and_marked() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Text(VALID_REPLY.to_string())],
    ));

    let outcome = h
        .orchestrator
        .generate(request(model), CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_new_session);
    assert!(outcome.response.is_valid);
    assert_eq!(
        outcome.actions,
        vec![
            FollowUpAction::OpenDocument,
            FollowUpAction::Preview,
            FollowUpAction::Export,
        ]
    );
    assert_eq!(
        outcome.reply.lines().next().unwrap(),
        "Created a two-slide quarterly review deck."
    );
    assert_eq!(
        marker::decode(&outcome.reply),
        Some(outcome.session_id.clone())
    );

    let doc_path = outcome.document_path.expect("document materialized");
    let on_disk = tokio::fs::read_to_string(&doc_path).await.unwrap();
    assert!(on_disk.starts_with("---\nmarp: true"));
    assert!(on_disk.contains("# Outlook"));

    let session = h.store.get(&outcome.session_id).await.unwrap().unwrap();
    assert_eq!(
        session.document_path.as_deref(),
        Some(doc_path.to_string_lossy().as_ref())
    );
    assert!(session.project_path.is_some());
    assert_eq!(
        h.workspace.materialized_sessions().await,
        vec![outcome.session_id]
    );

    let usage = outcome.usage.expect("stop chunk carries usage");
    assert_eq!(usage.output_tokens, 20);
}

#[tokio::test]
async fn marker_in_history_resumes_session_and_replays_prior_deck() {
    let h = harness().await;
    let session = h.store.create().await.unwrap();
    let doc = h.root.path().join("prior-deck.md");
    tokio::fs::write(&doc, "---\nmarp: true\n---\n\n# Prior Deck\n")
        .await
        .unwrap();
    h.store
        .update_document_path(&session.id, &doc.to_string_lossy())
        .await
        .unwrap();

    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Text(VALID_REPLY.to_string())],
    ));
    let mut req = request(model.clone());
    req.history = vec![
        ChatTurn::User {
            text: "Make me a deck".to_string(),
        },
        ChatTurn::Assistant {
            text: format!("Done.\n\n{}", marker::encode(&session.id)),
            participant: GENERATOR_PARTICIPANT.to_string(),
        },
    ];
    req.prompt = "Add a closing slide".to_string();

    let outcome = h
        .orchestrator
        .generate(req, CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.is_new_session);
    assert_eq!(outcome.session_id, session.id);
    // Resumed sessions never re-emit the marker.
    assert_eq!(marker::decode(&outcome.reply), None);

    let sent = model.requests().await;
    assert_eq!(sent.len(), 1);
    let prompt_text: String = sent[0]
        .messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(prompt_text.contains("# Prior Deck"));
}

#[tokio::test]
async fn orphaned_marker_starts_a_fresh_session() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Text(VALID_REPLY.to_string())],
    ));
    let mut req = request(model);
    req.history = vec![ChatTurn::Assistant {
        text: format!("Done.\n\n{}", marker::encode("0123456789abcdef01234567")),
        participant: GENERATOR_PARTICIPANT.to_string(),
    }];

    let outcome = h
        .orchestrator
        .generate(req, CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_new_session);
    assert_ne!(outcome.session_id, "0123456789abcdef01234567");
    assert_eq!(marker::decode(&outcome.reply), Some(outcome.session_id));
}

#[tokio::test]
async fn cancellation_mid_stream_aborts_the_turn() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Stall("===SLIDES START===\n# Part".to_string())],
    ));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = h
        .orchestrator
        .generate(request(model), cancel)
        .await
        .err()
        .expect("cancelled turn must fail");
    assert!(matches!(err, SlidesmithError::Cancelled));
    assert!(err.is_cancellation());

    // Nothing reached the workspace or the session record.
    assert!(h.workspace.materialized_sessions().await.is_empty());
    for session in h.store.list().await.unwrap() {
        assert!(session.document_path.is_none());
    }
}

#[tokio::test]
async fn unsupported_primary_model_retries_on_fallback() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![
            ScriptedReply::Unsupported,
            ScriptedReply::Text(VALID_REPLY.to_string()),
        ],
    ));

    let outcome = h
        .orchestrator
        .generate(request(model.clone()), CancellationToken::new())
        .await
        .unwrap();
    assert!(outcome.response.is_valid);

    let sent = model.requests().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].model, "gpt-4o");
    assert_eq!(sent[1].model, "gpt-4o-mini");
}

#[tokio::test]
async fn unsupported_fallback_model_is_fatal() {
    let h = harness().await;
    // Primary already IS the fallback, so there is nothing left to retry.
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o-mini",
        vec![ScriptedReply::Unsupported],
    ));

    let err = h
        .orchestrator
        .generate(request(model), CancellationToken::new())
        .await
        .err()
        .expect("no retry available");
    assert!(matches!(err, SlidesmithError::ModelNotSupported { .. }));
}

#[tokio::test]
async fn missing_model_is_fatal() {
    let h = harness().await;
    let mut req = request(Arc::new(MockModel::new("unused")));
    req.model = None;

    let err = h
        .orchestrator
        .generate(req, CancellationToken::new())
        .await
        .err()
        .expect("no model transport");
    assert!(matches!(err, SlidesmithError::MissingModel));
}

#[tokio::test]
async fn transport_denial_passes_through_untouched() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Denied],
    ));

    let err = h
        .orchestrator
        .generate(request(model), CancellationToken::new())
        .await
        .err()
        .expect("denied invocation");
    assert!(matches!(err, SlidesmithError::PermissionDenied(_)));
}

#[tokio::test]
async fn invalid_reply_preserves_raw_output_and_marker() {
    let h = harness().await;
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Text("too short".to_string())],
    ));

    let outcome = h
        .orchestrator
        .generate(request(model), CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.response.is_valid);
    assert!(outcome.actions.is_empty());
    assert!(outcome.document_path.is_none());
    assert!(outcome.reply.contains("too short"));
    // Even failed turns emit the marker so a retry lands in the same session.
    assert_eq!(marker::decode(&outcome.reply), Some(outcome.session_id));
    assert!(h.workspace.materialized_sessions().await.is_empty());
}

#[tokio::test]
async fn workspace_failure_surfaces_as_workspace_error() {
    let h = harness().await;
    h.workspace.fail_next_materialize();
    let model = Arc::new(MockModel::with_replies(
        "gpt-4o",
        vec![ScriptedReply::Text(VALID_REPLY.to_string())],
    ));

    let err = h
        .orchestrator
        .generate(request(model), CancellationToken::new())
        .await
        .err()
        .expect("materialize failure");
    assert!(matches!(err, SlidesmithError::Workspace { .. }));
}
