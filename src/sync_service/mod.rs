//! Lock-protected bulk resync of builtin marketplaces
//!
//! Resolves its targets from an explicit path list, the
//! `BUILTIN_MARKETPLACES` environment variable, or the already-registered
//! local marketplaces, then re-registers and reinstalls each one behind
//! the cross-process sync lock. Per-plugin failures are counted, never
//! raised: one bad plugin cannot block the rest of a marketplace or the
//! other marketplaces.

pub mod lock;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::agents::AgentImporter;
use crate::common::string_utils::sanitize_marketplace_name;
use crate::engine::EngineConfig;
use crate::installer::{self, McpAccumulator};
use crate::marketplace::fetcher::{AddMarketplaceRequest, MarketplaceFetcher};
use crate::marketplace::metadata::SourceType;
use crate::parser::PluginParser;
use crate::paths::PathResolver;
use lock::SyncLock;

/// Comma-separated local marketplace paths picked up by the resync
pub const BUILTIN_MARKETPLACES_ENV: &str = "BUILTIN_MARKETPLACES";

/// Per-marketplace tallies of one resync run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSyncStats {
    pub name: String,
    pub installed: usize,
    pub failed: usize,
    pub agents_imported: usize,
}

/// Aggregate result of one resync run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub marketplaces: Vec<MarketplaceSyncStats>,
}

impl ResyncResult {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            duration_ms: 0,
            marketplaces: Vec::new(),
        }
    }
}

/// Read-only view of the service's process-wide state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_syncing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_result: Option<ResyncResult>,
}

#[derive(Default)]
struct ServiceState {
    is_syncing: bool,
    last_sync_time: Option<DateTime<Utc>>,
    last_sync_result: Option<ResyncResult>,
}

/// One instance per process; the file lock guards across processes.
pub struct BuiltinMarketplaceSyncService {
    paths: PathResolver,
    engine: EngineConfig,
    state: Mutex<ServiceState>,
}

impl BuiltinMarketplaceSyncService {
    pub fn new(paths: PathResolver, engine: EngineConfig) -> Self {
        Self {
            paths,
            engine,
            state: Mutex::new(ServiceState::default()),
        }
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        SyncStatus {
            // The lock file also counts: another process may be syncing.
            is_syncing: state.is_syncing || lock::is_held(&self.paths.sync_lock_path()),
            last_sync_time: state.last_sync_time,
            last_sync_result: state.last_sync_result.clone(),
        }
    }

    /// Run the full resync. Contention on the sync lock returns a typed
    /// failure without touching any marketplace directory.
    pub fn sync_builtin_marketplaces(&self, explicit_paths: &[PathBuf]) -> ResyncResult {
        let lock = match SyncLock::acquire(&self.paths.sync_lock_path()) {
            Ok(Some(lock)) => lock,
            Ok(None) => return ResyncResult::failure("Sync already in progress"),
            Err(e) => return ResyncResult::failure(e.to_string()),
        };

        {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state.is_syncing = true;
        }
        let started = Instant::now();

        let targets = self.resolve_targets(explicit_paths);
        info!(targets = targets.len(), "builtin marketplace resync started");
        let marketplaces: Vec<MarketplaceSyncStats> = targets
            .iter()
            .map(|(name, source)| self.sync_one(name, source.as_deref()))
            .collect();

        let result = ResyncResult {
            success: true,
            error: None,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            marketplaces,
        };

        drop(lock);
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.is_syncing = false;
        state.last_sync_time = Some(Utc::now());
        state.last_sync_result = Some(result.clone());
        result
    }

    /// Target priority: explicit paths > `BUILTIN_MARKETPLACES` env var >
    /// every registered local marketplace (reinstall in place).
    fn resolve_targets(&self, explicit_paths: &[PathBuf]) -> Vec<(String, Option<PathBuf>)> {
        if !explicit_paths.is_empty() {
            return explicit_paths
                .iter()
                .map(|path| (name_for_path(path), Some(path.clone())))
                .collect();
        }

        if let Ok(configured) = std::env::var(BUILTIN_MARKETPLACES_ENV) {
            let paths: Vec<PathBuf> = configured
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            if !paths.is_empty() {
                return paths
                    .into_iter()
                    .map(|path| (name_for_path(&path), Some(path)))
                    .collect();
            }
        }

        let fetcher = MarketplaceFetcher::new(&self.paths, &self.engine);
        fetcher
            .list_marketplaces()
            .unwrap_or_default()
            .into_iter()
            .filter(|info| info.metadata.source_type == SourceType::Local)
            .map(|info| (info.name, None))
            .collect()
    }

    /// Resync one marketplace: re-register it from its source path when
    /// one is given, then clean, install every plugin, flush the MCP
    /// config, and import the marketplace's agents.
    fn sync_one(&self, name: &str, source: Option<&Path>) -> MarketplaceSyncStats {
        let mut stats = MarketplaceSyncStats {
            name: name.to_string(),
            installed: 0,
            failed: 0,
            agents_imported: 0,
        };
        let fetcher = MarketplaceFetcher::new(&self.paths, &self.engine);

        if let Some(source) = source {
            if !source.exists() {
                warn!(marketplace = name, path = %source.display(), "builtin marketplace path no longer exists; skipping");
                return stats;
            }
            if self.paths.marketplace_dir(name).exists() {
                if let Err(e) = fetcher.remove_marketplace(name) {
                    warn!(marketplace = name, error = %e, "stale marketplace removal failed");
                }
            }
            let request = AddMarketplaceRequest {
                name: name.to_string(),
                source_type: SourceType::Local,
                source: source.display().to_string(),
                branch: None,
                cos_config: None,
                auto_update: None,
            };
            if let Err(e) = fetcher.add_marketplace(&request) {
                warn!(marketplace = name, error = %e, "re-add failed; skipping");
                return stats;
            }
        } else if !self.paths.marketplace_dir(name).is_dir() {
            warn!(marketplace = name, "registered marketplace directory missing; skipping");
            return stats;
        }

        let strategy = installer::strategy_for(&self.engine);
        if let Err(e) = strategy.clean_before_install() {
            warn!(marketplace = name, error = %e, "pre-install clean failed");
        }

        let parser = PluginParser::new(&self.paths);
        let mut mcp = McpAccumulator::default();
        for plugin_name in fetcher.list_plugins(name).unwrap_or_default() {
            let plugin_dir = self.paths.marketplace_dir(name).join(&plugin_name);
            let installed = parser
                .parse_plugin(&plugin_dir, Some(name), Some(&plugin_name))
                .and_then(|plugin| strategy.install(&plugin, &mut mcp));
            match installed {
                Ok(_) => stats.installed += 1,
                Err(e) => {
                    warn!(marketplace = name, plugin = %plugin_name, error = %e, "plugin install failed");
                    stats.failed += 1;
                }
            }
        }

        if let Err(e) = strategy.flush_mcp_config(&mcp) {
            warn!(marketplace = name, error = %e, "MCP config flush failed");
        }

        match AgentImporter::new(&self.paths).import_agents_from_marketplace(name) {
            Ok(imported) => stats.agents_imported = imported.imported,
            Err(e) => warn!(marketplace = name, error = %e, "agent import failed"),
        }

        info!(
            marketplace = name,
            installed = stats.installed,
            failed = stats.failed,
            agents = stats.agents_imported,
            "marketplace resynced"
        );
        stats
    }
}

fn name_for_path(path: &Path) -> String {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    sanitize_marketplace_name(&basename)
}
