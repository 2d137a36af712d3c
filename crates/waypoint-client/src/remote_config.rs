//! Remote-config freshness check.
//!
//! Probes the server's config version and refreshes the cached asset-digest
//! and item-template blobs whose stored fetch time has fallen behind the
//! reported timestamp.

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;
use waypoint_proto::messages::{decode_body, RemoteConfigResponse};
use waypoint_proto::request::RequestType;

use crate::cache::{CacheStore, CachedBlob, KEY_ASSET_DIGEST, KEY_ITEM_TEMPLATES};
use crate::client::RpcClient;
use crate::session::now_ms;

/// Probe the remote config and refresh stale cached artifacts.
pub async fn check_remote_config(client: &RpcClient, cache: &dyn CacheStore) -> Result<()> {
    let primary = client
        .call(LogicalRequest::bare(RequestType::DownloadRemoteConfig))
        .await?;
    let config: RemoteConfigResponse = decode_body(&primary)?;

    refresh_if_stale(
        client,
        cache,
        KEY_ASSET_DIGEST,
        RequestType::GetAssetDigest,
        config.asset_digest_timestamp_ms,
    )
    .await?;
    refresh_if_stale(
        client,
        cache,
        KEY_ITEM_TEMPLATES,
        RequestType::DownloadItemTemplates,
        config.item_templates_timestamp_ms,
    )
    .await?;
    Ok(())
}

async fn refresh_if_stale(
    client: &RpcClient,
    cache: &dyn CacheStore,
    key: &str,
    fetch_type: RequestType,
    remote_timestamp_ms: i64,
) -> Result<()> {
    if let Some(blob) = cache.load(key) {
        if blob.is_fresh(remote_timestamp_ms) {
            tracing::debug!(key, "cached config blob still fresh");
            return Ok(());
        }
    }

    tracing::info!(key, remote_timestamp_ms, "refreshing config blob");
    let data = client.call(LogicalRequest::bare(fetch_type)).await?;
    cache.store(
        key,
        CachedBlob {
            data,
            fetched_ms: now_ms(),
        },
    );
    Ok(())
}
