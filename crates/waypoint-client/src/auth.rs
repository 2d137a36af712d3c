//! Credentials and the reauthentication seam.

use async_trait::async_trait;
use bytes::Bytes;

use waypoint_proto::envelope::TicketBlob;
use waypoint_proto::error::Result;

use crate::session::Session;

/// Short-lived server-issued credential held by the session.
#[derive(Debug, Clone)]
pub struct AuthTicket {
    pub data: Bytes,
    /// Expiry, unix epoch milliseconds.
    pub expires_ms: i64,
}

impl AuthTicket {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_ms <= now_ms
    }
}

impl From<TicketBlob> for AuthTicket {
    fn from(blob: TicketBlob) -> Self {
        Self {
            data: blob.data,
            expires_ms: blob.expires_ms,
        }
    }
}

/// Session credential: the long-lived bearer token, plus the ticket currently
/// issued against it (if any). The envelope builder prefers a live ticket and
/// falls back to the token.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: Bytes,
    pub ticket: Option<AuthTicket>,
}

impl Credential {
    pub fn new(token: Bytes) -> Self {
        Self {
            token,
            ticket: None,
        }
    }

    /// The ticket, if present and not expired at `now_ms`.
    pub fn live_ticket(&self, now_ms: i64) -> Option<&AuthTicket> {
        self.ticket.as_ref().filter(|t| !t.is_expired(now_ms))
    }
}

/// Reauthentication collaborator. Invoked when the ticket is expired or the
/// server reports an invalid token; expected to refresh the session
/// credential in place.
#[async_trait]
pub trait Reauthenticator: Send + Sync {
    async fn reauthenticate(&self, session: &Session) -> Result<()>;
}
