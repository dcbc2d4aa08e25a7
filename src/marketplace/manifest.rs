//! Marketplace manifest: `.claude-plugin/marketplace.json`
//!
//! Declares the plugins a marketplace offers (optionally with explicit
//! skill paths) and first-class agent definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentStudioError, Result, fs as fs_err};
use crate::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<MarketplaceOwner>,
    #[serde(default)]
    pub metadata: Option<ManifestMetadata>,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub agents: Vec<AgentDeclaration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceOwner {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One plugin declared by the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Explicit skill paths; when present these take precedence over
    /// filesystem convention scanning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

/// One agent declared by the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDeclaration {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Path of a JSON config file, relative to the marketplace root
    #[serde(default)]
    pub source: Option<String>,
    /// Inline config; wins over `source` when both are present
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl MarketplaceManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| fs_err::read_failed(path, &e))?;
        serde_json::from_str(&content).map_err(|e| AgentStudioError::PluginParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the manifest below a marketplace root; a missing file is `None`,
    /// a malformed one is an error.
    pub fn load_optional(marketplace_root: &Path) -> Result<Option<Self>> {
        let path = paths::marketplace_manifest_path(marketplace_root);
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    pub fn plugin_entry(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "name": "community",
            "owner": { "name": "AgentStudio Team" },
            "metadata": { "version": "1.2.0" },
            "plugins": [
                { "name": "deploy-tools", "description": "Deployment helpers" },
                { "name": "skill-pack", "description": "Skills", "skills": ["./skills/search"] }
            ],
            "agents": [
                { "name": "Code Reviewer", "source": "./agents/code-reviewer.json" }
            ]
        }"#;

        let manifest: MarketplaceManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("community"));
        assert_eq!(manifest.plugins.len(), 2);
        assert_eq!(manifest.agents.len(), 1);
        assert_eq!(
            manifest.plugin_entry("skill-pack").unwrap().skills,
            vec!["./skills/search"]
        );
        assert!(manifest.plugin_entry("missing").is_none());
    }

    #[test]
    fn test_load_optional_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(MarketplaceManifest::load_optional(temp.path())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_optional_malformed_is_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".claude-plugin");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("marketplace.json"), "not json {{{").unwrap();

        let result = MarketplaceManifest::load_optional(temp.path());
        assert!(matches!(
            result,
            Err(AgentStudioError::PluginParseFailed { .. })
        ));
    }
}
