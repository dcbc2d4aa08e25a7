//! Installation errors

use super::AgentStudioError;

/// Creates an error for a non-symlink file occupying an install target
pub fn target_occupied(path: impl Into<String>) -> AgentStudioError {
    AgentStudioError::TargetOccupied { path: path.into() }
}
