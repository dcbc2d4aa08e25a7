//! Marketplace lifecycle errors

use super::AgentStudioError;

/// Creates a marketplace already exists error
pub fn exists(name: impl Into<String>) -> AgentStudioError {
    AgentStudioError::MarketplaceExists { name: name.into() }
}

/// Creates a marketplace not found error
pub fn not_found(name: impl Into<String>) -> AgentStudioError {
    AgentStudioError::MarketplaceNotFound { name: name.into() }
}

/// Creates an error for syncing a local marketplace
pub fn not_syncable(name: impl Into<String>) -> AgentStudioError {
    AgentStudioError::MarketplaceNotSyncable { name: name.into() }
}

/// Creates an invalid marketplace source error
pub fn invalid_source(
    source: impl Into<String>,
    reason: impl Into<String>,
) -> AgentStudioError {
    AgentStudioError::InvalidMarketplaceSource {
        src: source.into(),
        reason: reason.into(),
    }
}
