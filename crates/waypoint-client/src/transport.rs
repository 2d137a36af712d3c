//! Transport seam and the reqwest-backed production implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use waypoint_proto::error::{Result, RpcError};

use crate::config::ClientConfig;

/// Transport collaborator: POST an opaque binary body to an endpoint and
/// return the opaque response body. A network-layer failure or a non-2xx
/// status is a transport error; no retry happens at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: Bytes) -> Result<Bytes>;
}

/// HTTPS transport backed by `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .build()
            .map_err(|e| RpcError::Internal(format!("http client build: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: Bytes) -> Result<Bytes> {
        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("http status {status}")));
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(raw)
    }
}
