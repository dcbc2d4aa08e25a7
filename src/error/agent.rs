//! Agent import errors

use super::AgentStudioError;

/// Creates an agent already exists error
pub fn exists(id: impl Into<String>) -> AgentStudioError {
    AgentStudioError::AgentExists { id: id.into() }
}

/// Creates a built-in agent protection error
pub fn builtin_protected(id: impl Into<String>) -> AgentStudioError {
    AgentStudioError::BuiltinAgentProtected { id: id.into() }
}

/// Creates a missing agent config error
pub fn missing_config(name: impl Into<String>) -> AgentStudioError {
    AgentStudioError::AgentMissingConfig { name: name.into() }
}
