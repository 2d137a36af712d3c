//! Global settings mutator.

use bytes::Bytes;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;
use waypoint_proto::messages::{decode_body, DownloadSettingsResponse};
use waypoint_proto::request::RequestType;

use crate::route::ResponseHandler;
use crate::session::{Session, SettingsState};

pub struct SettingsHandler;

impl ResponseHandler for SettingsHandler {
    fn request_type(&self) -> RequestType {
        RequestType::DownloadSettings
    }

    fn handle(&self, session: &Session, _request: &LogicalRequest, payload: &Bytes) -> Result<()> {
        let resp: DownloadSettingsResponse = decode_body(payload)?;

        if let Some(error) = resp.error {
            tracing::warn!(%error, "settings fetch reported an error, keeping current settings");
            return Ok(());
        }

        match (resp.hash, resp.settings) {
            (Some(hash), Some(value)) => {
                tracing::debug!(%hash, "settings replaced");
                session.replace_settings(SettingsState { value, hash });
            }
            // Hash matched server-side: no settings in the response.
            _ => tracing::debug!("settings unchanged"),
        }
        Ok(())
    }
}
