//! `GET /health`.

use crate::error::GatewayError;
use crate::http::{check_response, decode_json, transport};
use crate::wire::HealthResponse;
use crate::{HealthStatus, HttpGateway};

impl HttpGateway {
    /// Ask the service whether its model is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or times out, the service
    /// returns a non-success status, or the body cannot be decoded.
    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let url = self.config.endpoint("health")?;
        let timeout = self.config.timeout();
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport(e, timeout))?;
        let resp = check_response(resp).await?;
        let body: HealthResponse = decode_json(resp, timeout).await?;
        Ok(body.into())
    }
}
