//! Adding, removing, and listing marketplaces
//!
//! `add_marketplace` is all-or-nothing: any failure during fetch, copy, or
//! download deletes the partially created directory so no orphaned state
//! survives. Removal cascades: every contained plugin is uninstalled (and
//! every imported agent unlinked) before the directory is deleted.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::agents::AgentImporter;
use crate::archive::{self, ArchiveKind};
use crate::common::fs::{CopyOptions, copy_dir_recursive};
use crate::common::string_utils::sanitize_marketplace_name;
use crate::engine::EngineConfig;
use crate::error::{AgentStudioError, Result, fetch, marketplace as mkt_err};
use crate::git;
use crate::installer;
use crate::marketplace::manifest::MarketplaceManifest;
use crate::marketplace::metadata::{AutoUpdatePolicy, CosConfig, MarketplaceMetadata, SourceType};
use crate::parser::PluginParser;
use crate::paths::PathResolver;

/// Parameters for registering a marketplace
#[derive(Debug, Clone)]
pub struct AddMarketplaceRequest {
    pub name: String,
    pub source_type: SourceType,
    pub source: String,
    pub branch: Option<String>,
    pub cos_config: Option<CosConfig>,
    pub auto_update: Option<AutoUpdatePolicy>,
}

/// Result of a successful add
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResult {
    pub name: String,
    pub plugin_count: usize,
    pub agent_count: usize,
}

/// A registered marketplace as seen by the read side
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceInfo {
    pub name: String,
    pub metadata: MarketplaceMetadata,
    pub plugin_count: usize,
}

/// Adds, syncs, removes, and inspects marketplaces
pub struct MarketplaceFetcher<'a> {
    pub(crate) paths: &'a PathResolver,
    pub(crate) engine: &'a EngineConfig,
}

impl<'a> MarketplaceFetcher<'a> {
    pub fn new(paths: &'a PathResolver, engine: &'a EngineConfig) -> Self {
        Self { paths, engine }
    }

    /// Register a marketplace and fetch its content. No partial state
    /// survives a failure.
    pub fn add_marketplace(&self, request: &AddMarketplaceRequest) -> Result<AddResult> {
        let name = sanitize_marketplace_name(&request.name);
        let dir = self.paths.marketplace_dir(&name);
        if dir.exists() {
            return Err(mkt_err::exists(&name));
        }
        fs::create_dir_all(self.paths.marketplaces_dir())
            .map_err(|e| crate::error::fs::write_failed(&self.paths.marketplaces_dir(), &e))?;

        match self.populate(request, &name, &dir) {
            Ok(result) => Ok(result),
            Err(e) => {
                if let Err(cleanup) = crate::common::fs::remove_dir_if_exists(&dir) {
                    warn!(marketplace = %name, error = %cleanup, "failed to clean up partial add");
                }
                Err(e)
            }
        }
    }

    fn populate(
        &self,
        request: &AddMarketplaceRequest,
        name: &str,
        dir: &Path,
    ) -> Result<AddResult> {
        self.fetch_source(request, dir)?;

        let mut metadata = MarketplaceMetadata::new(request.source_type, &request.source);
        metadata.branch = request.branch.clone();
        metadata.cos_config = request.cos_config.clone();
        metadata.auto_update = request.auto_update.clone();
        metadata.save(&self.paths.marketplace_metadata_path(name))?;

        let plugin_count = plugin_dirs(dir).len();
        let agent_count = declared_agent_count(dir)?;
        info!(marketplace = %name, plugins = plugin_count, agents = agent_count, "marketplace added");

        Ok(AddResult {
            name: name.to_string(),
            plugin_count,
            agent_count,
        })
    }

    fn fetch_source(&self, request: &AddMarketplaceRequest, dir: &Path) -> Result<()> {
        match request.source_type {
            SourceType::Git => git::clone(&request.source, dir, request.branch.as_deref()),
            SourceType::Github => git::clone(
                &github_clone_url(&request.source),
                dir,
                request.branch.as_deref(),
            ),
            SourceType::Local => self.copy_local_source(&request.source, dir),
            SourceType::Cos | SourceType::Archive => {
                let url = resolve_download_url(
                    request.source_type,
                    &request.source,
                    request.cos_config.as_ref(),
                )?;
                download_and_extract(&url, dir)
            }
        }
    }

    fn copy_local_source(&self, source: &str, dir: &Path) -> Result<()> {
        let source_path = dunce::canonicalize(source).map_err(|_| {
            mkt_err::invalid_source(source, "local path does not exist")
        })?;
        if !source_path.is_dir() {
            return Err(mkt_err::invalid_source(source, "local path is not a directory"));
        }
        copy_dir_recursive(&source_path, dir, &CopyOptions::marketplace_source())
            .map_err(|e| crate::error::fs::write_failed(dir, &e))
    }

    /// Remove a marketplace, uninstalling every contained plugin and
    /// unlinking its imported agents first so nothing dangles.
    pub fn remove_marketplace(&self, name: &str) -> Result<()> {
        let dir = self.paths.marketplace_dir(name);
        if !dir.is_dir() {
            return Err(mkt_err::not_found(name));
        }

        let strategy = installer::strategy_for(self.engine);
        let parser = PluginParser::new(self.paths);
        for plugin_name in plugin_dirs(&dir) {
            let plugin_dir = dir.join(&plugin_name);
            match parser.parse_plugin(&plugin_dir, Some(name), Some(&plugin_name)) {
                Ok(plugin) => {
                    if let Err(e) = strategy.uninstall(&plugin) {
                        warn!(marketplace = name, plugin = %plugin_name, error = %e, "uninstall failed");
                    }
                }
                Err(e) => {
                    warn!(marketplace = name, plugin = %plugin_name, error = %e, "skipping unparsable plugin");
                }
            }
        }

        if let Err(e) = AgentImporter::new(self.paths).uninstall_marketplace_agents(name) {
            warn!(marketplace = name, error = %e, "agent unlink failed");
        }

        fs::remove_dir_all(&dir).map_err(|e| crate::error::fs::write_failed(&dir, &e))?;
        info!(marketplace = name, "marketplace removed");
        Ok(())
    }

    /// Names of the plugins a marketplace contains (directory listing).
    pub fn list_plugins(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.paths.marketplace_dir(name);
        if !dir.is_dir() {
            return Err(mkt_err::not_found(name));
        }
        Ok(plugin_dirs(&dir))
    }

    pub fn get_marketplace(&self, name: &str) -> Result<MarketplaceInfo> {
        let dir = self.paths.marketplace_dir(name);
        if !dir.is_dir() {
            return Err(mkt_err::not_found(name));
        }
        let metadata = MarketplaceMetadata::load(&self.paths.marketplace_metadata_path(name))?;
        Ok(MarketplaceInfo {
            name: name.to_string(),
            metadata,
            plugin_count: plugin_dirs(&dir).len(),
        })
    }

    /// Every registered marketplace that still has a readable metadata
    /// sidecar; directories without one are skipped with a warning.
    pub fn list_marketplaces(&self) -> Result<Vec<MarketplaceInfo>> {
        let root = self.paths.marketplaces_dir();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut marketplaces = Vec::new();
        for name in plugin_dirs(&root) {
            match self.get_marketplace(&name) {
                Ok(info) => marketplaces.push(info),
                Err(e) => warn!(marketplace = %name, error = %e, "skipping marketplace without metadata"),
            }
        }
        Ok(marketplaces)
    }
}

/// Expand a GitHub `owner/repo` shorthand; full URLs pass through.
pub(crate) fn github_clone_url(source: &str) -> String {
    if source.contains("://") || source.starts_with("git@") {
        source.to_string()
    } else {
        format!("https://github.com/{}.git", source.trim_end_matches(".git"))
    }
}

/// Resolve the archive URL for a COS or archive source: an explicit
/// `cosConfig.url` wins, then bucket/region(/path) construction, then
/// probing the source for well-known archive names.
pub(crate) fn resolve_download_url(
    source_type: SourceType,
    source: &str,
    cos: Option<&CosConfig>,
) -> Result<String> {
    match source_type {
        SourceType::Archive => Ok(source.to_string()),
        SourceType::Cos => {
            if let Some(cos) = cos {
                if let Some(url) = &cos.url {
                    return Ok(url.clone());
                }
                if let (Some(bucket), Some(region)) = (&cos.bucket, &cos.region) {
                    let base = format!("https://{bucket}.cos.{region}.myqcloud.com");
                    if let Some(path) = &cos.path {
                        return Ok(format!("{base}/{}", path.trim_start_matches('/')));
                    }
                    return probe_archive_url(&base);
                }
            }
            if source.starts_with("http") {
                if ArchiveKind::from_name(archive::file_name_from_url(source)).is_some() {
                    return Ok(source.to_string());
                }
                return probe_archive_url(source.trim_end_matches('/'));
            }
            Err(mkt_err::invalid_source(
                source,
                "cannot resolve an archive URL from the COS configuration",
            ))
        }
        _ => Err(mkt_err::invalid_source(source, "not a downloadable source")),
    }
}

fn probe_archive_url(base: &str) -> Result<String> {
    for candidate in [
        format!("{base}/marketplace.tar.gz"),
        format!("{base}/marketplace.zip"),
    ] {
        if archive::head_ok(&candidate) {
            return Ok(candidate);
        }
    }
    Err(fetch::download_failed(
        base,
        "no archive found at marketplace.tar.gz or marketplace.zip",
    ))
}

/// Download an archive URL and extract it into `dest`, flattening a
/// single wrapping subdirectory.
pub(crate) fn download_and_extract(url: &str, dest: &Path) -> Result<()> {
    let file_name = archive::file_name_from_url(url);
    let kind = ArchiveKind::from_name(file_name).ok_or_else(|| {
        mkt_err::invalid_source(url, "unsupported archive format (expected .tar.gz, .tar, or .zip)")
    })?;

    let staging = tempfile::Builder::new()
        .prefix(".agentstudio-download-")
        .tempdir_in(crate::temp::temp_dir_base())
        .map_err(AgentStudioError::from)?;
    let archive_path = staging.path().join(file_name);
    archive::download_to(url, &archive_path)?;
    archive::extract(&archive_path, dest, kind)?;
    archive::flatten_single_subdir(dest)
}

/// Non-hidden top-level subdirectories, sorted; this listing is the
/// plugin count for a marketplace.
pub(crate) fn plugin_dirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

/// Agents the marketplace manifest declares; no manifest means zero.
pub(crate) fn declared_agent_count(dir: &Path) -> Result<usize> {
    Ok(MarketplaceManifest::load_optional(dir)?
        .map(|manifest| manifest.agents.len())
        .unwrap_or(0))
}
