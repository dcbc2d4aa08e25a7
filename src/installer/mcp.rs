//! Shared MCP configuration handling
//!
//! Both install strategies end up writing the engine's merged `mcp.json`.
//! The symlink strategy merges additively per plugin, tagging every entry
//! with its provenance; the copy strategy collects entries into an
//! accumulator that is flushed once per full install run as a
//! full-replace write.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{AgentStudioError, Result, fs as fs_err};

/// Provenance tag key scoping MCP entries to `marketplace/plugin`
pub const INSTALLED_BY_KEY: &str = "_installedBy";

/// Collects MCP server entries across the plugins of one install run.
///
/// The accumulator is threaded explicitly through the install call chain;
/// plugins are processed sequentially, so on a name collision the last
/// plugin processed wins.
#[derive(Debug, Default)]
pub struct McpAccumulator {
    servers: Map<String, Value>,
}

impl McpAccumulator {
    pub fn insert(&mut self, name: impl Into<String>, config: Value) {
        self.servers.insert(name.into(), config);
    }

    pub fn servers(&self) -> &Map<String, Value> {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Read the engine's shared MCP config; a missing file is an empty map.
pub fn read_shared_config(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = fs::read_to_string(path).map_err(|e| fs_err::read_failed(path, &e))?;
    let value: Value =
        serde_json::from_str(&content).map_err(|e| AgentStudioError::PluginParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(crate::parser::mcp_servers_from_value(&value))
}

/// Write the engine's shared MCP config in the wrapped format.
pub fn write_shared_config(path: &Path, servers: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
    }
    let wrapped = serde_json::json!({ "mcpServers": servers });
    let content = serde_json::to_string_pretty(&wrapped)?;
    fs::write(path, content).map_err(|e| fs_err::write_failed(path, &e))?;
    Ok(())
}
