//! Per-marketplace sidecar metadata
//!
//! Written to `.claude-plugin/.agentstudio-metadata.json` inside each
//! marketplace directory on add, and mutated on sync and update checks.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentStudioError, Result, fs as fs_err};

/// Where a marketplace's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Any git remote URL
    Git,
    /// GitHub `owner/repo` shorthand
    Github,
    /// A directory on this machine
    Local,
    /// A cloud-object-storage bucket holding an archive
    Cos,
    /// A direct archive URL
    Archive,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceType::Git => "git",
            SourceType::Github => "github",
            SourceType::Local => "local",
            SourceType::Cos => "cos",
            SourceType::Archive => "archive",
        };
        f.write_str(s)
    }
}

/// Object-storage coordinates for `cos` sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Object key of the archive inside the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Fully resolved archive URL; overrides bucket/region/path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Auto-update policy and its bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoUpdatePolicy {
    pub enabled: bool,
    /// Check interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
}

/// The sidecar metadata file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceMetadata {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_config: Option<CosConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<AutoUpdatePolicy>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketplaceMetadata {
    pub fn new(source_type: SourceType, source: impl Into<String>) -> Self {
        Self {
            source_type,
            source: source.into(),
            branch: None,
            cos_config: None,
            auto_update: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| fs_err::read_failed(path, &e))?;
        serde_json::from_str(&content).map_err(|e| AgentStudioError::PluginParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| fs_err::write_failed(path, &e))?;
        Ok(())
    }

    /// Stamp the metadata as just-updated
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
