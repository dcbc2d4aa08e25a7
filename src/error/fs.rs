//! File system errors

use std::path::Path;

use super::AgentStudioError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> AgentStudioError {
    AgentStudioError::FileNotFound { path: path.into() }
}

/// Creates a read failed error
pub fn read_failed(path: &Path, err: &std::io::Error) -> AgentStudioError {
    AgentStudioError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a write failed error
pub fn write_failed(path: &Path, err: &std::io::Error) -> AgentStudioError {
    AgentStudioError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a generic IO error
pub fn io_error(message: impl Into<String>) -> AgentStudioError {
    AgentStudioError::IoError {
        message: message.into(),
    }
}
