//! Envelope builder.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use rand::Rng;

use waypoint_proto::envelope::{AuthSection, LogicalRequest, RequestEnvelope, TicketBlob};
use waypoint_proto::error::Result;

use crate::auth::Reauthenticator;
use crate::session::{now_ms, Session};
use crate::sign::Signer;

/// Builds signed request envelopes with a strictly increasing request id.
///
/// The counter starts at a randomized non-zero value so ids do not collide
/// across client restarts; ids are assigned with an atomic increment so
/// concurrent calls never share one.
pub struct EnvelopeBuilder {
    next_request_id: AtomicU64,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        let seed: u32 = rand::thread_rng().gen_range(1..=u32::MAX);
        Self {
            next_request_id: AtomicU64::new(u64::from(seed)),
        }
    }

    fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Produce a fully populated, signed envelope for `requests`.
    ///
    /// Attaches the session's ticket when it is still live; otherwise runs
    /// the reauthentication collaborator first and falls back to whatever
    /// credential it leaves behind (fresh ticket preferred, bearer token
    /// otherwise). Reauthentication failure propagates to the caller.
    pub async fn build(
        &self,
        session: &Session,
        requests: Vec<LogicalRequest>,
        signer: &dyn Signer,
        reauth: &dyn Reauthenticator,
    ) -> Result<RequestEnvelope> {
        let auth = self.resolve_auth(session, reauth).await?;

        let mut envelope = RequestEnvelope {
            request_id: self.next_request_id(),
            position: session.position(),
            auth,
            requests,
            signature: Bytes::new(),
        };

        tracing::debug!(
            request_id = envelope.request_id,
            requests = envelope.requests.len(),
            "building envelope"
        );

        envelope.signature = signer.sign(&envelope).await?;
        Ok(envelope)
    }

    async fn resolve_auth(
        &self,
        session: &Session,
        reauth: &dyn Reauthenticator,
    ) -> Result<AuthSection> {
        let now = now_ms();
        if let Some(ticket) = session.credential().live_ticket(now) {
            return Ok(AuthSection::Ticket(TicketBlob {
                data: ticket.data.clone(),
                expires_ms: ticket.expires_ms,
            }));
        }

        tracing::debug!("no live ticket, reauthenticating");
        reauth.reauthenticate(session).await?;

        let credential = session.credential();
        if let Some(ticket) = credential.live_ticket(now_ms()) {
            return Ok(AuthSection::Ticket(TicketBlob {
                data: ticket.data.clone(),
                expires_ms: ticket.expires_ms,
            }));
        }
        Ok(AuthSection::Token(credential.token))
    }
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
