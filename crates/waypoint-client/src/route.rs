//! Response routing.
//!
//! Separates the primary response (index 0, the caller's own request) from
//! the batch and dispatches every payload to the handler registered for its
//! originating request type. Handler failures are logged and isolated: a
//! best-effort side effect never costs the caller their primary result.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use waypoint_proto::envelope::{LogicalRequest, RequestEnvelope};
use waypoint_proto::error::{Result, RpcError};
use waypoint_proto::request::RequestType;

use crate::session::Session;

/// A state mutator keyed by the request type it interprets.
pub trait ResponseHandler: Send + Sync {
    fn request_type(&self) -> RequestType;

    /// Apply the payload's side effects to the session. `request` is the
    /// originating logical request (some handlers need its body).
    fn handle(&self, session: &Session, request: &LogicalRequest, payload: &Bytes) -> Result<()>;
}

/// Registry and router for response payloads.
#[derive(Default)]
pub struct ResponseRouter {
    handlers: DashMap<RequestType, Arc<dyn ResponseHandler>>,
}

impl ResponseRouter {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn ResponseHandler>) {
        self.handlers.insert(handler.request_type(), handler);
    }

    pub fn registered_types(&self) -> Vec<RequestType> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    /// Route a response sequence against its originating envelope and return
    /// the primary payload.
    ///
    /// Zero payloads is a protocol violation. Default-set payloads are always
    /// dispatched; the primary payload is additionally dispatched when its
    /// request type is a known inventory-mutating operation. Request types
    /// with no registered handler are ignored.
    pub fn route(
        &self,
        session: &Session,
        envelope: &RequestEnvelope,
        payloads: &[Bytes],
    ) -> Result<Bytes> {
        if payloads.is_empty() {
            return Err(RpcError::Protocol("response carried zero payloads".into()));
        }
        if payloads.len() != envelope.requests.len() {
            tracing::warn!(
                requests = envelope.requests.len(),
                payloads = payloads.len(),
                "response count does not mirror request count"
            );
        }

        let primary = payloads[0].clone();

        for (idx, (request, payload)) in envelope.requests.iter().zip(payloads).enumerate() {
            let ty = request.request_type;
            let routable = ty.is_default() || (idx == 0 && ty.mutates_inventory());
            if !routable {
                continue;
            }
            let Some(handler) = self.handlers.get(&ty).map(|e| e.value().clone()) else {
                continue;
            };
            if let Err(e) = handler.handle(session, request, payload) {
                tracing::warn!(request_type = ?ty, error = %e, "response handler failed, side effect skipped");
            }
        }

        Ok(primary)
    }
}
