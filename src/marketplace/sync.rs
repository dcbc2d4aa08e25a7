//! Resynchronizing a marketplace from its stored source
//!
//! Git marketplaces fast-forward to the remote head in place. Remote
//! archive sources (COS, generic archives) download to a staging
//! directory first and only swap the new tree in after a successful
//! download; the previous tree is kept as a backup for the duration of
//! the swap. Local marketplaces cannot be synced.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::common::fs::remove_dir_if_exists;
use crate::error::{AgentStudioError, Result, fs as fs_err, marketplace as mkt_err};
use crate::git;
use crate::marketplace::fetcher::{MarketplaceFetcher, download_and_extract, resolve_download_url};
use crate::marketplace::metadata::{MarketplaceMetadata, SourceType};

/// Result of a successful sync
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub synced_at: DateTime<Utc>,
}

impl MarketplaceFetcher<'_> {
    /// Bring a marketplace up to date with its stored source. Dispatch is
    /// by the *stored* metadata type, not anything re-derived.
    pub fn sync_marketplace(&self, name: &str) -> Result<SyncOutcome> {
        let dir = self.paths.marketplace_dir(name);
        if !dir.is_dir() {
            return Err(mkt_err::not_found(name));
        }
        let metadata_path = self.paths.marketplace_metadata_path(name);
        let mut metadata = MarketplaceMetadata::load(&metadata_path)?;

        match metadata.source_type {
            SourceType::Local => return Err(mkt_err::not_syncable(name)),
            SourceType::Git | SourceType::Github => {
                git::update_to_remote_head(&dir, metadata.branch.as_deref())?;
            }
            SourceType::Cos | SourceType::Archive => {
                self.replace_from_remote(name, &dir, &metadata)?;
            }
        }

        // The metadata sidecar is restored/refreshed after the content
        // moved; remote swaps wipe it with the rest of the old tree.
        metadata.touch();
        metadata.save(&metadata_path)?;
        info!(marketplace = name, source_type = %metadata.source_type, "marketplace synced");

        Ok(SyncOutcome {
            name: name.to_string(),
            source_type: metadata.source_type,
            synced_at: metadata.updated_at.unwrap_or_else(Utc::now),
        })
    }

    /// Download the new tree into staging, then swap: current → backup,
    /// staging → live. A failed download only discards the staging
    /// directory; a failed swap restores the backup.
    fn replace_from_remote(
        &self,
        name: &str,
        dir: &Path,
        metadata: &MarketplaceMetadata,
    ) -> Result<()> {
        let url = resolve_download_url(
            metadata.source_type,
            &metadata.source,
            metadata.cos_config.as_ref(),
        )?;

        let staging = tempfile::Builder::new()
            .prefix(".sync-staging-")
            .tempdir_in(self.paths.marketplaces_dir())
            .map_err(AgentStudioError::from)?;
        let incoming = staging.path().join("content");
        download_and_extract(&url, &incoming)?;

        let backup = self.paths.marketplaces_dir().join(format!("{name}.backup"));
        remove_dir_if_exists(&backup).map_err(|e| fs_err::write_failed(&backup, &e))?;
        fs::rename(dir, &backup).map_err(|e| fs_err::write_failed(dir, &e))?;

        if let Err(e) = fs::rename(&incoming, dir) {
            warn!(marketplace = name, error = %e, "swap failed; restoring previous tree");
            if let Err(restore) = fs::rename(&backup, dir) {
                warn!(marketplace = name, error = %restore, "backup restore failed");
            }
            return Err(fs_err::write_failed(dir, &e));
        }

        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!(marketplace = name, error = %e, "failed to delete backup tree");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig};
    use crate::marketplace::fetcher::AddMarketplaceRequest;
    use crate::paths::PathResolver;
    use tempfile::TempDir;

    fn commit_file(repo: &git2::Repository, name: &str, content: &str) {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
            .unwrap();
    }

    fn fixture(temp: &TempDir) -> (PathResolver, EngineConfig) {
        let paths = PathResolver::new(temp.path().join("home"));
        let engine = EngineConfig::resolve(&paths, Engine::Claude);
        (paths, engine)
    }

    #[test]
    fn test_sync_git_marketplace_pulls_new_commits() {
        let temp = TempDir::new().unwrap();
        let upstream_path = temp.path().join("upstream");
        fs::create_dir_all(&upstream_path).unwrap();
        let upstream = git2::Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "README.md", "# marketplace");

        let (paths, engine) = fixture(&temp);
        let fetcher = MarketplaceFetcher::new(&paths, &engine);
        fetcher
            .add_marketplace(&AddMarketplaceRequest {
                name: "gitmarket".to_string(),
                source_type: SourceType::Git,
                source: upstream_path.display().to_string(),
                branch: None,
                cos_config: None,
                auto_update: None,
            })
            .unwrap();

        commit_file(&upstream, "plugin.md", "new upstream content");
        let outcome = fetcher.sync_marketplace("gitmarket").unwrap();

        assert_eq!(outcome.source_type, SourceType::Git);
        assert!(paths.marketplace_dir("gitmarket").join("plugin.md").exists());
        // Metadata survived the sync with an updated timestamp.
        let metadata =
            MarketplaceMetadata::load(&paths.marketplace_metadata_path("gitmarket")).unwrap();
        assert!(metadata.updated_at.is_some());
    }

    #[test]
    fn test_sync_local_marketplace_is_user_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("plugin-a")).unwrap();

        let (paths, engine) = fixture(&temp);
        let fetcher = MarketplaceFetcher::new(&paths, &engine);
        fetcher
            .add_marketplace(&AddMarketplaceRequest {
                name: "localmarket".to_string(),
                source_type: SourceType::Local,
                source: source.display().to_string(),
                branch: None,
                cos_config: None,
                auto_update: None,
            })
            .unwrap();

        let result = fetcher.sync_marketplace("localmarket");
        assert!(matches!(
            result,
            Err(AgentStudioError::MarketplaceNotSyncable { .. })
        ));
        // The live tree is untouched.
        assert!(paths.marketplace_dir("localmarket").join("plugin-a").is_dir());
    }

    #[test]
    fn test_sync_unknown_marketplace() {
        let temp = TempDir::new().unwrap();
        let (paths, engine) = fixture(&temp);
        let fetcher = MarketplaceFetcher::new(&paths, &engine);
        assert!(matches!(
            fetcher.sync_marketplace("nope"),
            Err(AgentStudioError::MarketplaceNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_archive_download_leaves_live_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("plugin-a")).unwrap();

        let (paths, engine) = fixture(&temp);
        let fetcher = MarketplaceFetcher::new(&paths, &engine);
        fetcher
            .add_marketplace(&AddMarketplaceRequest {
                name: "archmarket".to_string(),
                source_type: SourceType::Local,
                source: source.display().to_string(),
                branch: None,
                cos_config: None,
                auto_update: None,
            })
            .unwrap();

        // Flip the stored metadata to an unreachable archive source.
        let metadata_path = paths.marketplace_metadata_path("archmarket");
        let mut metadata = MarketplaceMetadata::load(&metadata_path).unwrap();
        metadata.source_type = SourceType::Archive;
        metadata.source = "http://127.0.0.1:1/market.tar.gz".to_string();
        metadata.save(&metadata_path).unwrap();

        let result = fetcher.sync_marketplace("archmarket");
        assert!(result.is_err());
        assert!(paths.marketplace_dir("archmarket").join("plugin-a").is_dir());
        // No staging or backup leftovers.
        assert!(!paths.marketplaces_dir().join("archmarket.backup").exists());
    }
}
