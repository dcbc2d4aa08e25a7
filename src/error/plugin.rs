//! Plugin manifest and parse errors

use super::AgentStudioError;

/// Creates a plugin not found error
pub fn not_found(marketplace: impl Into<String>, name: impl Into<String>) -> AgentStudioError {
    AgentStudioError::PluginNotFound {
        marketplace: marketplace.into(),
        name: name.into(),
    }
}

/// Creates a manifest not found error
pub fn manifest_not_found(path: impl Into<String>) -> AgentStudioError {
    AgentStudioError::ManifestNotFound { path: path.into() }
}

/// Creates an invalid manifest error
pub fn manifest_invalid(path: impl Into<String>, reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::ManifestInvalid {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::PluginParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
