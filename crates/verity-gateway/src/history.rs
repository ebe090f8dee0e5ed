//! `GET /history` and `DELETE /history`.

use std::num::NonZeroU32;
use verity_core::{EntryKey, HistoryEntry};

use crate::error::GatewayError;
use crate::http::{check_response, decode_json, transport};
use crate::wire::{HistoryItem, history_entries};
use crate::HttpGateway;

/// Relative endpoint addressing `key` for deletion.
///
/// Durable ids go in the path; text keys go in the query string, for backends
/// that expose no id.
pub(crate) fn delete_path(key: &EntryKey) -> String {
    match key {
        EntryKey::Id(id) => format!("history/{}", urlencoding::encode(id)),
        EntryKey::Text(text) => format!("history?text={}", urlencoding::encode(text)),
    }
}

impl HttpGateway {
    /// Fetch up to `limit` history entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or times out, the service
    /// returns a non-success status, or any row fails to decode.
    pub async fn get_history(&self, limit: NonZeroU32) -> Result<Vec<HistoryEntry>, GatewayError> {
        let url = self.config.endpoint(&format!("history?limit={limit}"))?;
        let timeout = self.config.timeout();
        tracing::debug!(%url, "listing history");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport(e, timeout))?;
        let resp = check_response(resp).await?;
        let items: Vec<HistoryItem> = decode_json(resp, timeout).await?;
        history_entries(items)
    }

    /// Delete the entry addressed by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or times out, or the
    /// service answers with any non-success status.
    pub async fn delete_entry(&self, key: &EntryKey) -> Result<(), GatewayError> {
        let url = self.config.endpoint(&delete_path(key))?;
        let timeout = self.config.timeout();
        tracing::debug!(%url, durable = key.is_durable(), "deleting history entry");

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| transport(e, timeout))?;
        check_response(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durable_key_goes_in_path() {
        assert_eq!(delete_path(&EntryKey::Id("42".into())), "history/42");
    }

    #[test]
    fn text_key_is_url_encoded_query() {
        assert_eq!(
            delete_path(&EntryKey::Text("moon & cheese?".into())),
            "history?text=moon%20%26%20cheese%3F"
        );
    }
}
