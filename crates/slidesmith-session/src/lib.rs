// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session identity and persistence for the Slidesmith deck generator.
//!
//! Two halves:
//! - [`marker`] embeds/recovers an opaque session id in chat transcripts, so
//!   multi-turn identity survives a host that only replays history.
//! - [`store`] persists per-session state (timestamps, document/project/export
//!   paths) in WAL-mode SQLite with TTL-based eviction.

pub mod database;
pub mod marker;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::{PathField, Session, SessionStore, SweepReport};
