//! Inventory delta mutator.

use bytes::Bytes;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;
use waypoint_proto::messages::{decode_body, InventoryDelta};
use waypoint_proto::request::RequestType;

use crate::route::ResponseHandler;
use crate::session::Session;

pub struct InventoryDeltaHandler;

impl ResponseHandler for InventoryDeltaHandler {
    fn request_type(&self) -> RequestType {
        RequestType::GetInventory
    }

    fn handle(&self, session: &Session, _request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let delta: InventoryDelta = decode_body(payload)?;
        let timestamp = delta.new_timestamp_ms;
        let items = delta.items.len();
        if session.apply_inventory_delta(delta) {
            tracing::debug!(timestamp, items, "inventory delta applied");
        } else {
            tracing::debug!(
                timestamp,
                stored = session.inventory_timestamp_ms(),
                "stale inventory delta discarded"
            );
        }
        Ok(())
    }
}
