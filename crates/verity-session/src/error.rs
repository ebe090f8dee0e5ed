//! Session error types.

use thiserror::Error;
use verity_core::EntryKey;
use verity_gateway::GatewayError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The gateway call failed; local state is unchanged.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// No server id is known for a text-keyed entry; nothing was sent.
    #[error("no server id known for {key}")]
    Unresolved { key: EntryKey },

    /// The session was torn down before or during the operation.
    #[error("session has been torn down")]
    TornDown,
}
