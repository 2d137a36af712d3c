//! Release/evolve mutator: drops the acted-on entity from the inventory.

use bytes::Bytes;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::{Result, RpcError};
use waypoint_proto::messages::{decode_body, CreatureActionRequest, CreatureActionResponse};
use waypoint_proto::request::RequestType;

use crate::route::ResponseHandler;
use crate::session::Session;

/// Shared mutator for the release and evolve operations; both remove the
/// acted-on entity on a successful (or already-handled) result.
pub struct CreatureActionHandler {
    request_type: RequestType,
}

impl CreatureActionHandler {
    pub fn new(request_type: RequestType) -> Self {
        Self { request_type }
    }
}

impl ResponseHandler for CreatureActionHandler {
    fn request_type(&self) -> RequestType {
        self.request_type
    }

    fn handle(&self, session: &Session, request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let resp: CreatureActionResponse = decode_body(payload)?;
        if !resp.entity_removed() {
            tracing::debug!(request_type = ?self.request_type, "action failed, inventory untouched");
            return Ok(());
        }

        // The entity id lives in the original request body.
        let body = request
            .body
            .as_ref()
            .ok_or_else(|| RpcError::Protocol("creature action request had no body".into()))?;
        let req: CreatureActionRequest = decode_body(body)?;

        let removed = session.remove_inventory_item(req.creature_id);
        tracing::debug!(
            creature_id = req.creature_id,
            removed,
            request_type = ?self.request_type,
            "creature action applied"
        );
        Ok(())
    }
}
