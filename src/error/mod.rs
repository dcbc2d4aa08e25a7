//! Error types and handling for AgentStudio
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`marketplace`]: Marketplace lifecycle errors
//! - [`plugin`]: Plugin manifest and parse errors
//! - [`install`]: Installation errors
//! - [`agent`]: Agent import errors
//! - [`git`]: Git operation errors
//! - [`fetch`]: Download and extraction errors
//! - [`fs`]: File system errors

pub mod agent;
pub mod fetch;
pub mod fs;
pub mod git;
pub mod install;
pub mod marketplace;
pub mod plugin;

#[allow(unused_imports)]
pub use agent::{builtin_protected, exists as agent_exists, missing_config as agent_missing_config};
#[allow(unused_imports)]
pub use fetch::{download_failed, extract_failed};
#[allow(unused_imports)]
pub use fs::{
    io_error, not_found as file_not_found, read_failed as file_read_failed,
    write_failed as file_write_failed,
};
#[allow(unused_imports)]
pub use git::{clone_failed, fetch_failed, operation_failed as git_operation_failed};
#[allow(unused_imports)]
pub use install::target_occupied;
#[allow(unused_imports)]
pub use marketplace::{
    exists as marketplace_exists, not_found as marketplace_not_found,
    not_syncable as marketplace_not_syncable,
};
#[allow(unused_imports)]
pub use plugin::{
    manifest_invalid, manifest_not_found, not_found as plugin_not_found,
    parse_failed as plugin_parse_failed,
};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for AgentStudio operations
#[derive(Error, Diagnostic, Debug)]
pub enum AgentStudioError {
    // Marketplace errors
    #[error("Marketplace '{name}' already exists")]
    #[diagnostic(
        code(agentstudio::marketplace::exists),
        help("Remove the existing marketplace first, or pick a different name")
    )]
    MarketplaceExists { name: String },

    #[error("Marketplace '{name}' not found")]
    #[diagnostic(code(agentstudio::marketplace::not_found))]
    MarketplaceNotFound { name: String },

    #[error("Marketplace '{name}' is a local directory and cannot be synced")]
    #[diagnostic(
        code(agentstudio::marketplace::not_syncable),
        help("Local marketplaces track their source path; re-add it to pick up changes")
    )]
    MarketplaceNotSyncable { name: String },

    #[error("Invalid marketplace source '{src}': {reason}")]
    #[diagnostic(code(agentstudio::marketplace::invalid_source))]
    InvalidMarketplaceSource { src: String, reason: String },

    // Plugin errors
    #[error("Plugin '{name}' not found in marketplace '{marketplace}'")]
    #[diagnostic(code(agentstudio::plugin::not_found))]
    PluginNotFound { marketplace: String, name: String },

    #[error("Plugin manifest not found for '{path}'")]
    #[diagnostic(
        code(agentstudio::plugin::manifest_not_found),
        help(
            "A plugin needs .claude-plugin/plugin.json, or a matching entry in an ancestor .claude-plugin/marketplace.json"
        )
    )]
    ManifestNotFound { path: String },

    #[error("Invalid plugin manifest at '{path}': {reason}")]
    #[diagnostic(code(agentstudio::plugin::manifest_invalid))]
    ManifestInvalid { path: String, reason: String },

    #[error("Failed to parse '{path}': {reason}")]
    #[diagnostic(code(agentstudio::plugin::parse_failed))]
    PluginParseFailed { path: String, reason: String },

    // Install errors
    #[error("Refusing to overwrite existing file at '{path}'")]
    #[diagnostic(
        code(agentstudio::install::target_occupied),
        help("The target path is a regular file, not a managed symlink; move it out of the way")
    )]
    TargetOccupied { path: String },

    // Agent errors
    #[error("Agent '{id}' already exists and is not managed by a marketplace")]
    #[diagnostic(code(agentstudio::agent::exists))]
    AgentExists { id: String },

    #[error("Agent '{id}' is built in and cannot be removed")]
    #[diagnostic(code(agentstudio::agent::builtin_protected))]
    BuiltinAgentProtected { id: String },

    #[error("Agent '{name}' declares neither a config file nor an inline config")]
    #[diagnostic(code(agentstudio::agent::missing_config))]
    AgentMissingConfig { name: String },

    // Sync service errors
    #[error("Sync already in progress")]
    #[diagnostic(code(agentstudio::sync::in_progress))]
    SyncInProgress,

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(agentstudio::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(agentstudio::git::clone_failed),
        help("Check that URL is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to fetch from remote: {reason}")]
    #[diagnostic(code(agentstudio::git::fetch_failed))]
    GitFetchFailed { reason: String },

    // Download/extract errors
    #[error("Failed to download '{url}': {reason}")]
    #[diagnostic(code(agentstudio::fetch::download_failed))]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to extract archive '{archive}': {reason}")]
    #[diagnostic(
        code(agentstudio::fetch::extract_failed),
        help("tar and unzip must be available on PATH")
    )]
    ExtractFailed { archive: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(agentstudio::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(agentstudio::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(agentstudio::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(agentstudio::fs::io_error))]
    IoError { message: String },

    #[error("Could not determine home directory")]
    #[diagnostic(
        code(agentstudio::fs::home_not_found),
        help("Set AGENTSTUDIO_HOME to point at a writable directory")
    )]
    HomeNotFound,
}

impl From<std::io::Error> for AgentStudioError {
    fn from(err: std::io::Error) -> Self {
        AgentStudioError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AgentStudioError {
    fn from(err: serde_json::Error) -> Self {
        AgentStudioError::PluginParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AgentStudioError {
    fn from(err: serde_yaml::Error) -> Self {
        AgentStudioError::PluginParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for AgentStudioError {
    fn from(err: git2::Error) -> Self {
        AgentStudioError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AgentStudioError {
    fn from(err: reqwest::Error) -> Self {
        AgentStudioError::DownloadFailed {
            url: err
                .url()
                .map_or_else(|| "unknown".to_string(), |u| u.to_string()),
            reason: err.to_string(),
        }
    }
}

/// Result type alias for AgentStudio operations
pub type Result<T> = miette::Result<T, AgentStudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentStudioError::MarketplaceNotFound {
            name: "community".to_string(),
        };
        assert_eq!(err.to_string(), "Marketplace 'community' not found");
    }

    #[test]
    fn test_error_code() {
        let err = AgentStudioError::SyncInProgress;
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("agentstudio::sync::in_progress".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AgentStudioError = io_err.into();
        assert!(matches!(err, AgentStudioError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: AgentStudioError = parse_result.unwrap_err().into();
        assert!(matches!(err, AgentStudioError::PluginParseFailed { .. }));
    }

    #[test]
    fn test_git_error_conversion() {
        let git_err = git2::Error::from_str("git error");
        let err: AgentStudioError = git_err.into();
        assert!(matches!(err, AgentStudioError::GitOperationFailed { .. }));
    }

    #[test]
    fn test_marketplace_exists() {
        let err = marketplace_exists("community");
        assert!(matches!(err, AgentStudioError::MarketplaceExists { .. }));
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_marketplace_not_syncable() {
        let err = marketplace_not_syncable("local-dev");
        assert!(matches!(err, AgentStudioError::MarketplaceNotSyncable { .. }));
        assert!(err.to_string().contains("cannot be synced"));
    }

    #[test]
    fn test_manifest_not_found() {
        let err = manifest_not_found("/plugins/foo");
        assert!(matches!(err, AgentStudioError::ManifestNotFound { .. }));
        assert!(err.to_string().contains("manifest not found"));
    }

    #[test]
    fn test_manifest_invalid() {
        let err = manifest_invalid("/plugins/foo/plugin.json", "missing required field 'name'");
        assert!(matches!(err, AgentStudioError::ManifestInvalid { .. }));
        assert!(err.to_string().contains("missing required field"));
    }

    #[test]
    fn test_target_occupied() {
        let err = target_occupied("/home/user/.claude/commands/deploy.md");
        assert!(matches!(err, AgentStudioError::TargetOccupied { .. }));
        assert!(err.to_string().contains("Refusing to overwrite"));
    }

    #[test]
    fn test_builtin_protected() {
        let err = builtin_protected("code-reviewer");
        assert!(matches!(err, AgentStudioError::BuiltinAgentProtected { .. }));
        assert!(err.to_string().contains("built in"));
    }

    #[test]
    fn test_sync_in_progress_message() {
        assert_eq!(
            AgentStudioError::SyncInProgress.to_string(),
            "Sync already in progress"
        );
    }

    #[test]
    fn test_download_failed() {
        let err = download_failed("https://example.com/m.tar.gz", "connection refused");
        assert!(matches!(err, AgentStudioError::DownloadFailed { .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}
