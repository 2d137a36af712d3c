//! Client config (strict parsing).

use serde::Deserialize;
use waypoint_proto::error::{Result, RpcError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Initial RPC endpoint; mutated in place after a server-announced
    /// migration or redirect.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Host suffix a server-announced endpoint must match to be accepted.
    #[serde(default = "default_allowed_host_suffix")]
    pub allowed_host_suffix: String,

    /// Maximum redirect/reauth recovery attempts for a single call.
    #[serde(default = "default_max_recovery_attempts")]
    pub max_recovery_attempts: u32,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            allowed_host_suffix: default_allowed_host_suffix(),
            max_recovery_attempts: default_max_recovery_attempts(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_endpoint.is_empty() {
            return Err(RpcError::Internal("api_endpoint must not be empty".into()));
        }
        if self.allowed_host_suffix.is_empty() {
            return Err(RpcError::Internal(
                "allowed_host_suffix must not be empty".into(),
            ));
        }
        if !(1..=64).contains(&self.max_recovery_attempts) {
            return Err(RpcError::Internal(
                "max_recovery_attempts must be between 1 and 64".into(),
            ));
        }
        if !(1000..=600_000).contains(&self.request_timeout_ms) {
            return Err(RpcError::Internal(
                "request_timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        if self.connect_timeout_ms >= self.request_timeout_ms {
            return Err(RpcError::Internal(
                "connect_timeout_ms must be less than request_timeout_ms".into(),
            ));
        }
        Ok(())
    }
}

fn default_api_endpoint() -> String {
    "https://rpc.game.example.com/plfe/rpc".into()
}
fn default_allowed_host_suffix() -> String {
    ".game.example.com".into()
}
fn default_max_recovery_attempts() -> u32 {
    5
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig =
        serde_yaml::from_str(s).map_err(|e| RpcError::Internal(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| RpcError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}
