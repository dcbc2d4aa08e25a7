//! Git operation errors

use super::AgentStudioError;

/// Creates a generic git operation error
pub fn operation_failed(message: impl Into<String>) -> AgentStudioError {
    AgentStudioError::GitOperationFailed {
        message: message.into(),
    }
}

/// Creates a clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a fetch failed error
pub fn fetch_failed(reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::GitFetchFailed {
        reason: reason.into(),
    }
}
