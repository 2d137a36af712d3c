//! Default-request batcher.
//!
//! Every user-initiated call (unless it is itself a raw batch) carries the
//! fixed housekeeping sequence so local state stays current without extra
//! round trips. Pure function of session state; no side effects.

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;
use waypoint_proto::messages::{encode_body, DownloadSettingsRequest, GetInventoryRequest};
use waypoint_proto::request::RequestType;

use crate::session::Session;

/// Produce the fixed default-request sequence, in wire order:
/// challenge check, hatched eggs, inventory delta, awarded badges, settings.
///
/// The inventory request carries the last applied delta timestamp; the
/// settings request carries the known settings hash, omitted when none exists
/// (which asks the server for a full settings object).
pub fn default_requests(session: &Session) -> Result<Vec<LogicalRequest>> {
    let inventory = GetInventoryRequest {
        last_timestamp_ms: session.inventory_timestamp_ms(),
    };
    let settings = DownloadSettingsRequest {
        hash: session.settings_hash(),
    };

    Ok(vec![
        LogicalRequest::bare(RequestType::CheckChallenge),
        LogicalRequest::bare(RequestType::GetHatchedEggs),
        LogicalRequest::new(RequestType::GetInventory, encode_body(&inventory)?),
        LogicalRequest::bare(RequestType::CheckAwardedBadges),
        LogicalRequest::new(RequestType::DownloadSettings, encode_body(&settings)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use waypoint_proto::envelope::Position;
    use waypoint_proto::messages::{decode_body, InventoryDelta};
    use waypoint_proto::request::DEFAULT_REQUEST_TYPES;

    use crate::session::SettingsState;

    fn session() -> Session {
        Session::new(
            Position {
                latitude: 1.0,
                longitude: 2.0,
                altitude: 0.0,
                accuracy: 10.0,
            },
            Bytes::from_static(b"token"),
        )
    }

    #[test]
    fn order_matches_default_set() {
        let s = session();
        let reqs = default_requests(&s).unwrap();
        let types: Vec<_> = reqs.iter().map(|r| r.request_type).collect();
        assert_eq!(types, DEFAULT_REQUEST_TYPES);
    }

    #[test]
    fn fresh_session_requests_full_settings_fetch() {
        let s = session();
        let reqs = default_requests(&s).unwrap();
        let settings_body = reqs[4].body.as_ref().unwrap();
        let parsed: DownloadSettingsRequest = decode_body(settings_body).unwrap();
        assert!(parsed.hash.is_none());
        // omitted on the wire, not serialized as null
        assert_eq!(&settings_body[..], b"{}");
    }

    #[test]
    fn known_state_is_threaded_through() {
        let s = session();
        s.apply_inventory_delta(InventoryDelta {
            new_timestamp_ms: 777,
            items: vec![],
        });
        s.replace_settings(SettingsState {
            value: serde_json::json!({}),
            hash: "h1".into(),
        });

        let reqs = default_requests(&s).unwrap();
        let inv: GetInventoryRequest = decode_body(reqs[2].body.as_ref().unwrap()).unwrap();
        assert_eq!(inv.last_timestamp_ms, 777);
        let set: DownloadSettingsRequest = decode_body(reqs[4].body.as_ref().unwrap()).unwrap();
        assert_eq!(set.hash.as_deref(), Some("h1"));
    }
}
