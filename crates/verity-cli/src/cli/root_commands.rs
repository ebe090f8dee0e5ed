use clap::{Args, Subcommand};

use crate::cli::subcommands::HistoryCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Classify a headline or article snippet as FAKE or REAL.
    Predict(PredictArgs),
    /// Prediction history stored by the backend.
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
    /// Check whether the backend has a model loaded.
    Health,
    /// Interactive session: type text to classify, `/help` for commands.
    Shell,
}

/// Arguments for `verity predict`.
#[derive(Clone, Debug, Args)]
pub struct PredictArgs {
    /// Text to classify. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

impl PredictArgs {
    #[must_use]
    pub fn joined(&self) -> String {
        self.text.join(" ")
    }
}
