//! Typed message bodies carried inside envelope payloads (JSON).
//!
//! Bodies are opaque bytes at the envelope layer; handlers parse them lazily
//! with [`decode_body`] only when a payload is actually routed to them.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Result, RpcError};

/// Serialize a message body for a logical request.
pub fn encode_body<T: Serialize>(msg: &T) -> Result<Bytes> {
    let raw = serde_json::to_vec(msg)
        .map_err(|e| RpcError::Internal(format!("encode body: {e}")))?;
    Ok(Bytes::from(raw))
}

/// Parse a payload into a typed message.
pub fn decode_body<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|e| RpcError::Protocol(format!("decode body: {e}")))
}

/// Incremental inventory fetch, parameterized by the last applied delta.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetInventoryRequest {
    /// Last known inventory timestamp; 0 requests a full fetch.
    pub last_timestamp_ms: i64,
}

/// One owned item/entity in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub kind: String,
    #[serde(default)]
    pub count: u32,
}

/// Server-pushed inventory delta.
#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryDelta {
    pub new_timestamp_ms: i64,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

/// Settings fetch; the hash is omitted when no prior hash exists, which
/// requests a full settings object.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadSettingsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Settings fetch result. `error` present means the existing settings stand.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadSettingsResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// Release/evolve request over an owned entity.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatureActionRequest {
    pub creature_id: u64,
}

/// Outcome of a release/evolve action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    /// The server already processed an identical action.
    AlreadyHandled,
    Failed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatureActionResponse {
    pub status: ActionStatus,
}

impl CreatureActionResponse {
    /// Whether the acted-on entity is gone from the player's inventory.
    pub fn entity_removed(&self) -> bool {
        matches!(
            self.status,
            ActionStatus::Success | ActionStatus::AlreadyHandled
        )
    }
}

/// Anti-abuse challenge state.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckChallengeResponse {
    #[serde(default)]
    pub show_challenge: bool,
    #[serde(default)]
    pub challenge_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetHatchedEggsResponse {
    #[serde(default)]
    pub hatched_egg_ids: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckAwardedBadgesResponse {
    #[serde(default)]
    pub awarded: Vec<String>,
}

/// Remote-config version probe result: freshness timestamps for the cached
/// config artifacts.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoteConfigResponse {
    pub asset_digest_timestamp_ms: i64,
    pub item_templates_timestamp_ms: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn settings_request_omits_absent_hash() {
        let raw = encode_body(&DownloadSettingsRequest { hash: None }).unwrap();
        assert_eq!(&raw[..], b"{}");

        let raw = encode_body(&DownloadSettingsRequest {
            hash: Some("abc".into()),
        })
        .unwrap();
        assert!(std::str::from_utf8(&raw).unwrap().contains("abc"));
    }

    #[test]
    fn action_status_wire_names() {
        let resp: CreatureActionResponse =
            decode_body(br#"{"status":"already_handled"}"#).unwrap();
        assert!(resp.entity_removed());

        let resp: CreatureActionResponse = decode_body(br#"{"status":"failed"}"#).unwrap();
        assert!(!resp.entity_removed());
    }

    #[test]
    fn malformed_body_is_protocol_error() {
        let err = decode_body::<InventoryDelta>(b"not json").unwrap_err();
        assert_eq!(err.class().as_str(), "PROTOCOL");
    }
}
