//! Entity structs for predictions and their cached history.

mod history;
mod prediction;

pub use history::{EntryKey, HistoryEntry};
pub use prediction::PredictionResult;
