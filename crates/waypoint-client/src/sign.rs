//! Envelope signing seam.

use async_trait::async_trait;
use bytes::Bytes;

use waypoint_proto::envelope::RequestEnvelope;
use waypoint_proto::error::Result;

/// Signing collaborator. Receives the fully populated envelope (position,
/// auth, requests; signature still empty) and returns the opaque signature to
/// attach as the sole platform payload.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, envelope: &RequestEnvelope) -> Result<Bytes>;
}
