// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the external seams of the generation pipeline.

pub mod model;
pub mod workspace;

pub use model::ModelAdapter;
pub use workspace::DeckWorkspace;
