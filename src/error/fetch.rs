//! Download and archive extraction errors

use super::AgentStudioError;

/// Creates a download failed error
pub fn download_failed(url: impl Into<String>, reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::DownloadFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an extraction failed error
pub fn extract_failed(archive: impl Into<String>, reason: impl Into<String>) -> AgentStudioError {
    AgentStudioError::ExtractFailed {
        archive: archive.into(),
        reason: reason.into(),
    }
}
