//! Request-type tag space.
//!
//! Every logical request carries one of these tags; the response router keys
//! its handler registry on them. Tags the client does not know decode as
//! `Unknown` and are ignored downstream (forward compatibility).

/// Request-type tag carried by every logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// Fetch player profile data.
    GetPlayer,
    /// Fetch map objects around a position.
    GetMapObjects,
    /// Anti-abuse challenge check (default set).
    CheckChallenge,
    /// Poll for hatched eggs (default set).
    GetHatchedEggs,
    /// Incremental inventory fetch (default set).
    GetInventory,
    /// Poll for newly awarded badges (default set).
    CheckAwardedBadges,
    /// Global settings fetch, hash-gated (default set).
    DownloadSettings,
    /// Remote-config version probe (asset digest / item template freshness).
    DownloadRemoteConfig,
    /// Full asset digest fetch.
    GetAssetDigest,
    /// Full item template fetch.
    DownloadItemTemplates,
    /// Release an owned creature back to the wild.
    ReleaseCreature,
    /// Evolve an owned creature.
    EvolveCreature,
    /// Tag this client does not know.
    Unknown(u16),
}

/// The fixed default-request sequence appended to every non-batch call,
/// in wire order.
pub const DEFAULT_REQUEST_TYPES: [RequestType; 5] = [
    RequestType::CheckChallenge,
    RequestType::GetHatchedEggs,
    RequestType::GetInventory,
    RequestType::CheckAwardedBadges,
    RequestType::DownloadSettings,
];

impl RequestType {
    /// Wire tag.
    pub fn as_u16(self) -> u16 {
        match self {
            RequestType::GetPlayer => 2,
            RequestType::GetMapObjects => 106,
            RequestType::CheckChallenge => 600,
            RequestType::GetHatchedEggs => 126,
            RequestType::GetInventory => 4,
            RequestType::CheckAwardedBadges => 490,
            RequestType::DownloadSettings => 5,
            RequestType::DownloadRemoteConfig => 3,
            RequestType::GetAssetDigest => 300,
            RequestType::DownloadItemTemplates => 6,
            RequestType::ReleaseCreature => 137,
            RequestType::EvolveCreature => 125,
            RequestType::Unknown(tag) => tag,
        }
    }

    /// Decode a wire tag. Unassigned tags map to `Unknown`.
    pub fn from_u16(tag: u16) -> Self {
        match tag {
            2 => RequestType::GetPlayer,
            106 => RequestType::GetMapObjects,
            600 => RequestType::CheckChallenge,
            126 => RequestType::GetHatchedEggs,
            4 => RequestType::GetInventory,
            490 => RequestType::CheckAwardedBadges,
            5 => RequestType::DownloadSettings,
            3 => RequestType::DownloadRemoteConfig,
            300 => RequestType::GetAssetDigest,
            6 => RequestType::DownloadItemTemplates,
            137 => RequestType::ReleaseCreature,
            125 => RequestType::EvolveCreature,
            other => RequestType::Unknown(other),
        }
    }

    /// Whether this type belongs to the default housekeeping set.
    pub fn is_default(self) -> bool {
        DEFAULT_REQUEST_TYPES.contains(&self)
    }

    /// Whether a successful response to this type removes an owned entity
    /// from the inventory.
    pub fn mutates_inventory(self) -> bool {
        matches!(
            self,
            RequestType::ReleaseCreature | RequestType::EvolveCreature
        )
    }
}
