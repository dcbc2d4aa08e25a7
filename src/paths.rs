//! Canonical on-disk locations for marketplaces, plugins, and shared state
//!
//! All location logic lives here as pure computations over an explicit home
//! root, so installed-state queries and tests can run against a temp home
//! instead of the real one.

use std::path::{Path, PathBuf};

use crate::error::{AgentStudioError, Result};

/// Directory name of the plugin/marketplace metadata folder
pub const CLAUDE_PLUGIN_DIR: &str = ".claude-plugin";

/// File name of the per-marketplace sidecar metadata
pub const METADATA_FILE: &str = ".agentstudio-metadata.json";

/// File name of the marketplace manifest
pub const MARKETPLACE_MANIFEST: &str = "marketplace.json";

/// File name of the plugin manifest
pub const PLUGIN_MANIFEST: &str = "plugin.json";

/// File name of the bulk resync lock, created directly under the home dir
pub const SYNC_LOCK_FILE: &str = ".agentstudio-marketplace-sync.lock";

/// Resolves canonical paths below a fixed home directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: PathBuf,
}

impl PathResolver {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve from the environment: `AGENTSTUDIO_HOME` wins, else the
    /// platform home directory.
    pub fn from_env() -> Result<Self> {
        if let Ok(home) = std::env::var("AGENTSTUDIO_HOME") {
            if !home.is_empty() {
                return Ok(Self::new(home));
            }
        }
        dirs::home_dir()
            .map(Self::new)
            .ok_or(AgentStudioError::HomeNotFound)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Root of all AgentStudio-managed data
    pub fn data_dir(&self) -> PathBuf {
        self.home.join(".agentstudio")
    }

    /// Directory holding one subdirectory per registered marketplace
    pub fn marketplaces_dir(&self) -> PathBuf {
        self.data_dir().join("marketplaces")
    }

    /// Root directory of a named marketplace
    pub fn marketplace_dir(&self, name: &str) -> PathBuf {
        self.marketplaces_dir().join(name)
    }

    /// Sidecar metadata file of a named marketplace
    pub fn marketplace_metadata_path(&self, name: &str) -> PathBuf {
        self.marketplace_dir(name)
            .join(CLAUDE_PLUGIN_DIR)
            .join(METADATA_FILE)
    }

    /// Resolved agent configs written by the importer, inside the marketplace
    pub fn marketplace_agents_dir(&self, name: &str) -> PathBuf {
        self.marketplace_dir(name)
            .join(CLAUDE_PLUGIN_DIR)
            .join("agents")
    }

    /// Shared directory that imported agents are linked into
    pub fn shared_agents_dir(&self) -> PathBuf {
        self.data_dir().join("agents")
    }

    /// Advisory lock file guarding the bulk resync
    pub fn sync_lock_path(&self) -> PathBuf {
        self.home.join(SYNC_LOCK_FILE)
    }
}

/// Marketplace manifest path below an arbitrary directory
pub fn marketplace_manifest_path(dir: &Path) -> PathBuf {
    dir.join(CLAUDE_PLUGIN_DIR).join(MARKETPLACE_MANIFEST)
}

/// Plugin manifest path below a plugin directory
pub fn plugin_manifest_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(CLAUDE_PLUGIN_DIR).join(PLUGIN_MANIFEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_paths() {
        let paths = PathResolver::new("/home/user");
        assert_eq!(
            paths.marketplace_dir("community"),
            PathBuf::from("/home/user/.agentstudio/marketplaces/community")
        );
        assert_eq!(
            paths.marketplace_metadata_path("community"),
            PathBuf::from(
                "/home/user/.agentstudio/marketplaces/community/.claude-plugin/.agentstudio-metadata.json"
            )
        );
    }

    #[test]
    fn test_lock_path_is_directly_under_home() {
        let paths = PathResolver::new("/home/user");
        assert_eq!(
            paths.sync_lock_path(),
            PathBuf::from("/home/user/.agentstudio-marketplace-sync.lock")
        );
    }

    #[test]
    fn test_manifest_paths() {
        let plugin = PathBuf::from("/m/plugins/demo");
        assert_eq!(
            plugin_manifest_path(&plugin),
            PathBuf::from("/m/plugins/demo/.claude-plugin/plugin.json")
        );
        assert_eq!(
            marketplace_manifest_path(&PathBuf::from("/m")),
            PathBuf::from("/m/.claude-plugin/marketplace.json")
        );
    }
}
