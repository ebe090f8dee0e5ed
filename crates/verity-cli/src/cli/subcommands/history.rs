use clap::Subcommand;

/// History commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HistoryCommands {
    /// List past predictions, newest first.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete a history entry by id, or every entry with the given text.
    Delete {
        key: String,
        /// Treat KEY as the entry text instead of its id.
        #[arg(long)]
        text: bool,
    },
}
