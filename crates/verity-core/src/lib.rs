//! # verity-core
//!
//! Core types and error types for Verity, the fake-news classification client.
//!
//! This crate provides the foundational types shared across all Verity crates:
//! - `Label` and `Confidence`, the canonical shape of a classification
//! - `PredictionResult` and `HistoryEntry` entities
//! - `EntryKey`, the durable-or-text identifier used for history deletion
//! - `NonEmptyText`, the validated submission payload
//! - `RequestPhase`, the request lifecycle state machine
//! - Cross-cutting error types

pub mod confidence;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod text;

pub use confidence::Confidence;
pub use entities::{EntryKey, HistoryEntry, PredictionResult};
pub use enums::{Label, RequestPhase};
pub use errors::CoreError;
pub use text::NonEmptyText;
