//! `POST /predict`.

use verity_core::{NonEmptyText, PredictionResult};

use crate::error::GatewayError;
use crate::http::{check_response, decode_json, transport};
use crate::wire::{PredictRequest, PredictResponse};
use crate::HttpGateway;

impl HttpGateway {
    /// Send `text` to the prediction service.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or times out, the service
    /// returns a non-success status, or the body is not a valid prediction.
    pub async fn post_predict(&self, text: &NonEmptyText) -> Result<PredictionResult, GatewayError> {
        let url = self.config.endpoint("predict")?;
        let timeout = self.config.timeout();
        tracing::debug!(%url, chars = text.as_str().chars().count(), "requesting prediction");

        let resp = self
            .http
            .post(url)
            .json(&PredictRequest {
                text: text.as_str(),
            })
            .send()
            .await
            .map_err(|e| transport(e, timeout))?;
        let resp = check_response(resp).await?;
        let body: PredictResponse = decode_json(resp, timeout).await?;
        let result = PredictionResult::try_from(body)?;

        tracing::debug!(label = %result.label, confidence = result.confidence.value(), "prediction received");
        Ok(result)
    }
}
