//! Acknowledge-only handlers.
//!
//! Hatched eggs and awarded badges are parsed and logged but not yet
//! materialized into session state; these are the hook points for future
//! event surfaces. The challenge check is surfaced at warn so embedders
//! notice a pending challenge.

use bytes::Bytes;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;
use waypoint_proto::messages::{
    decode_body, CheckAwardedBadgesResponse, CheckChallengeResponse, GetHatchedEggsResponse,
};
use waypoint_proto::request::RequestType;

use crate::route::ResponseHandler;
use crate::session::Session;

pub struct ChallengeHandler;

impl ResponseHandler for ChallengeHandler {
    fn request_type(&self) -> RequestType {
        RequestType::CheckChallenge
    }

    fn handle(&self, _session: &Session, _request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let resp: CheckChallengeResponse = decode_body(payload)?;
        if resp.show_challenge {
            tracing::warn!(url = ?resp.challenge_url, "server requested a challenge");
        }
        Ok(())
    }
}

pub struct HatchedEggsHandler;

impl ResponseHandler for HatchedEggsHandler {
    fn request_type(&self) -> RequestType {
        RequestType::GetHatchedEggs
    }

    fn handle(&self, _session: &Session, _request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let resp: GetHatchedEggsResponse = decode_body(payload)?;
        if !resp.hatched_egg_ids.is_empty() {
            tracing::debug!(count = resp.hatched_egg_ids.len(), "eggs hatched");
        }
        Ok(())
    }
}

pub struct AwardedBadgesHandler;

impl ResponseHandler for AwardedBadgesHandler {
    fn request_type(&self) -> RequestType {
        RequestType::CheckAwardedBadges
    }

    fn handle(&self, _session: &Session, _request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let resp: CheckAwardedBadgesResponse = decode_body(payload)?;
        if !resp.awarded.is_empty() {
            tracing::debug!(badges = ?resp.awarded, "badges awarded");
        }
        Ok(())
    }
}
