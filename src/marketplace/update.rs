//! Update checking for registered marketplaces
//!
//! Git sources compare the local HEAD against the fetched remote head;
//! archive-backed sources fetch the remote marketplace manifest and
//! compare version fields. When an auto-update policy is configured, its
//! bookkeeping is refreshed as a side effect.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::archive;
use crate::error::{Result, marketplace as mkt_err};
use crate::git;
use crate::marketplace::fetcher::{MarketplaceFetcher, resolve_download_url};
use crate::marketplace::manifest::MarketplaceManifest;
use crate::marketplace::metadata::{MarketplaceMetadata, SourceType};

/// Result of an update check; `checked_at` is always present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheck {
    pub name: String,
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_version: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl MarketplaceFetcher<'_> {
    pub fn check_for_updates(&self, name: &str) -> Result<UpdateCheck> {
        let dir = self.paths.marketplace_dir(name);
        if !dir.is_dir() {
            return Err(mkt_err::not_found(name));
        }
        let metadata_path = self.paths.marketplace_metadata_path(name);
        let mut metadata = MarketplaceMetadata::load(&metadata_path)?;
        let checked_at = Utc::now();

        let (has_update, local_version, remote_version) = match metadata.source_type {
            SourceType::Git | SourceType::Github => {
                let behind = git::has_remote_update(&dir, metadata.branch.as_deref())?;
                (behind, None, None)
            }
            SourceType::Local => (false, None, None),
            SourceType::Cos | SourceType::Archive => {
                let local = MarketplaceManifest::load_optional(&dir)?
                    .and_then(|m| m.metadata.and_then(|meta| meta.version));
                let remote = self.remote_manifest_version(&metadata)?;
                let has_update = match (&local, &remote) {
                    (Some(local), Some(remote)) => local != remote,
                    (None, Some(_)) => true,
                    _ => false,
                };
                (has_update, local, remote)
            }
        };

        if let Some(policy) = metadata.auto_update.as_mut() {
            if policy.enabled {
                policy.last_check = Some(checked_at);
                if let Some(remote) = &remote_version {
                    policy.last_version = Some(remote.clone());
                }
                metadata.save(&metadata_path)?;
            }
        }

        debug!(marketplace = name, has_update, "update check finished");
        Ok(UpdateCheck {
            name: name.to_string(),
            has_update,
            local_version,
            remote_version,
            checked_at,
        })
    }

    /// Version field of the remote manifest, fetched from the sibling
    /// `marketplace.json` next to the archive.
    fn remote_manifest_version(&self, metadata: &MarketplaceMetadata) -> Result<Option<String>> {
        let archive_url = resolve_download_url(
            metadata.source_type,
            &metadata.source,
            metadata.cos_config.as_ref(),
        )?;
        let manifest_url = match archive_url.rsplit_once('/') {
            Some((base, _)) => format!("{base}/marketplace.json"),
            None => return Ok(None),
        };
        let manifest = archive::fetch_json(&manifest_url)?;
        Ok(manifest
            .get("metadata")
            .and_then(|m| m.get("version"))
            .and_then(|v| v.as_str())
            .map(String::from))
    }
}
