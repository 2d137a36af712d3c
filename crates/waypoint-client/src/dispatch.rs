//! Call dispatcher: sends an envelope and drives the status-code state
//! machine (endpoint migration, redirect replay, invalid-token recovery).
//!
//! The active endpoint and the recovery bound are dispatcher state; the same
//! already-signed envelope is re-issued byte-for-byte on redirect and
//! invalid-token recovery. Recovery is a bounded loop, not recursion.

use std::sync::RwLock;

use bytes::Bytes;

use waypoint_proto::envelope::{
    decode_response_envelope, encode_request_envelope, RequestEnvelope, ResponseEnvelope,
    StatusCode,
};
use waypoint_proto::error::{Result, RpcError};
use waypoint_proto::request::RequestType;

use crate::auth::Reauthenticator;
use crate::config::ClientConfig;
use crate::route::ResponseRouter;
use crate::session::{now_ms, Session};
use crate::transport::Transport;

pub struct CallDispatcher {
    /// Active endpoint. Only ever advances to a server-provided value;
    /// last-writer-wins across concurrent calls.
    endpoint: RwLock<String>,
    allowed_host_suffix: String,
    max_recovery_attempts: u32,
}

impl CallDispatcher {
    pub fn new(cfg: &ClientConfig) -> Self {
        Self {
            endpoint: RwLock::new(cfg.api_endpoint.clone()),
            allowed_host_suffix: cfg.allowed_host_suffix.clone(),
            max_recovery_attempts: cfg.max_recovery_attempts,
        }
    }

    /// Endpoint the next call will hit.
    pub fn endpoint(&self) -> String {
        match self.endpoint.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Validate a server-announced endpoint and make it the active one.
    fn install_endpoint(&self, raw: &str) -> Result<()> {
        validate_endpoint(raw, &self.allowed_host_suffix)?;
        match self.endpoint.write() {
            Ok(mut g) => *g = raw.to_string(),
            Err(poisoned) => *poisoned.into_inner() = raw.to_string(),
        }
        tracing::info!(endpoint = raw, "api endpoint migrated");
        Ok(())
    }

    /// Send `envelope` and return the primary response payload.
    pub async fn dispatch(
        &self,
        session: &Session,
        envelope: &RequestEnvelope,
        transport: &dyn Transport,
        reauth: &dyn Reauthenticator,
        router: &ResponseRouter,
    ) -> Result<Bytes> {
        let body = encode_request_envelope(envelope);
        let mut attempts: u32 = 0;

        loop {
            let raw = transport.post(&self.endpoint(), body.clone()).await?;
            let response = decode_response_envelope(raw)?;

            if let Some(blob) = response.ticket.clone() {
                tracing::info!(expires_ms = blob.expires_ms, "refreshed ticket installed");
                session.install_ticket(blob.into());
            }

            match response.status {
                StatusCode::Ok => {
                    return self.settle(session, envelope, &response, router);
                }
                StatusCode::OkWithEndpoint => {
                    self.install_endpoint(announced_endpoint(&response)?)?;
                    return self.settle(session, envelope, &response, router);
                }
                StatusCode::Redirect => {
                    self.install_endpoint(announced_endpoint(&response)?)?;
                    attempts += 1;
                    tracing::debug!(attempts, "replaying envelope after redirect");
                }
                StatusCode::InvalidAuthToken => {
                    session.expire_ticket();
                    reauth.reauthenticate(session).await?;
                    attempts += 1;
                    tracing::debug!(attempts, "replaying envelope after reauthentication");
                }
                StatusCode::Unknown(code) => {
                    tracing::warn!(code, "unknown response status, routing anyway");
                    return self.settle(session, envelope, &response, router);
                }
            }

            if attempts >= self.max_recovery_attempts {
                return Err(RpcError::RecoveryExhausted { attempts });
            }
        }
    }

    /// Success path: record call markers, then route every payload and hand
    /// back the primary one.
    fn settle(
        &self,
        session: &Session,
        envelope: &RequestEnvelope,
        response: &ResponseEnvelope,
        router: &ResponseRouter,
    ) -> Result<Bytes> {
        session.mark_call(now_ms());
        if envelope
            .requests
            .first()
            .is_some_and(|r| r.request_type == RequestType::GetMapObjects)
        {
            session.mark_map_fetch(envelope.position);
        }
        router.route(session, envelope, &response.payloads)
    }
}

fn announced_endpoint(response: &ResponseEnvelope) -> Result<&str> {
    response
        .api_endpoint
        .as_deref()
        .ok_or_else(|| RpcError::Protocol("migration status without an endpoint".into()))
}

/// Extract the host of an https endpoint URL.
fn endpoint_host(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("https://")?;
    let host_port = rest.split(['/', '?']).next()?;
    let host = host_port.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// An endpoint is acceptable when it is https and its host is the allowlisted
/// domain or a subdomain of it. The subdomain match is anchored at a label
/// boundary so a lookalike host cannot smuggle the domain in as a suffix,
/// whether or not the configured suffix carries a leading dot.
fn validate_endpoint(url: &str, allowed_suffix: &str) -> Result<()> {
    let host = endpoint_host(url)
        .ok_or_else(|| RpcError::InvalidEndpoint(format!("not a https url: {url}")))?;

    let bare = allowed_suffix.trim_start_matches('.');
    if host == bare || host.ends_with(&format!(".{bare}")) {
        Ok(())
    } else {
        Err(RpcError::InvalidEndpoint(format!(
            "host {host} outside {allowed_suffix}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn allowlisted_hosts_pass() {
        for url in [
            "https://game.example.com/rpc",
            "https://eu1.game.example.com/plfe/rpc",
            "https://eu1.game.example.com:443/rpc?x=1",
        ] {
            assert!(validate_endpoint(url, ".game.example.com").is_ok(), "{url}");
        }
    }

    #[test]
    fn foreign_or_malformed_hosts_fail() {
        for url in [
            "https://evil.example.com/rpc",
            "https://game.example.com.evil.net/rpc",
            "http://eu1.game.example.com/rpc",
            "not a url",
            "https://",
        ] {
            let err = validate_endpoint(url, ".game.example.com").expect_err(url);
            assert_eq!(err.class().as_str(), "INVALID_ENDPOINT");
        }
    }

    #[test]
    fn lookalike_hosts_fail_for_both_suffix_spellings() {
        for suffix in [".game.example.com", "game.example.com"] {
            assert!(
                validate_endpoint("https://evilgame.example.com/rpc", suffix).is_err(),
                "suffix={suffix}"
            );
            assert!(
                validate_endpoint("https://eu1.game.example.com/rpc", suffix).is_ok(),
                "suffix={suffix}"
            );
            assert!(
                validate_endpoint("https://game.example.com/rpc", suffix).is_ok(),
                "suffix={suffix}"
            );
        }
    }

    #[test]
    fn invalid_endpoint_does_not_mutate_active_endpoint() {
        let cfg = ClientConfig::default();
        let d = CallDispatcher::new(&cfg);
        let before = d.endpoint();
        assert!(d.install_endpoint("https://evil.example.com/rpc").is_err());
        assert_eq!(d.endpoint(), before);
    }
}
