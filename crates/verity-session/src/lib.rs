//! # verity-session
//!
//! Client-side state for Verity: the prediction workflow, the history cache,
//! and the [`Session`] that drives both against a [`Gateway`].
//!
//! All state lives behind one lock that is never held across an await, so a
//! session behaves like a single serialized UI context even when its futures
//! run on a multi-threaded runtime:
//! - at most one prediction is in flight; extra submissions are dropped
//! - a successful prediction is prepended to the history and clears the input
//! - deletes touch the cache only after the server confirms them
//! - every gateway call is bounded by a timeout and aborted on teardown
//!
//! [`Gateway`]: verity_gateway::Gateway

mod error;
mod history;
mod notice;
mod session;
mod workflow;

pub use error::SessionError;
pub use history::{DeleteContract, HistoryCache, Reconciled};
pub use notice::Notice;
pub use session::{Session, SessionOptions, SessionView, SubmitOutcome};
pub use workflow::{Begin, PredictionWorkflow};
