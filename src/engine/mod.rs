//! Active-engine resolution and target directory layout
//!
//! AgentStudio installs plugin components for exactly one AI engine per
//! process. The engine decides where commands, agents, and skills land,
//! which file extension command files carry, and whether components are
//! materialized as symlinks or copies. The configuration is resolved once
//! at startup and passed by reference to every call site.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::PathResolver;

/// Supported AI engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Claude,
    Cursor,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Claude => "claude",
            Engine::Cursor => "cursor",
        }
    }

    pub fn parse(s: &str) -> Option<Engine> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Some(Engine::Claude),
            "cursor" => Some(Engine::Cursor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How components are materialized into the engine's directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// One symlink per component, pointing into the marketplace tree
    Symlink,
    /// Full copies, with the MCP config rebuilt per install run
    Copy,
}

/// Resolved target layout and capabilities of the active engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub engine: Engine,
    pub install_method: InstallMethod,
    /// Where command files land (`rules` for Cursor)
    pub commands_dir: PathBuf,
    /// Where agent definition files land
    pub agents_dir: PathBuf,
    /// Where skill directories land
    pub skills_dir: PathBuf,
    /// The engine's merged MCP server configuration file
    pub mcp_config_path: PathBuf,
    /// Extension command files carry in `commands_dir`
    pub command_extension: &'static str,
    /// Whether agent components are installable on this engine
    pub installs_agents: bool,
}

impl EngineConfig {
    /// Compute the layout for the given engine under the resolver's home
    pub fn resolve(paths: &PathResolver, engine: Engine) -> Self {
        match engine {
            Engine::Claude => {
                let root = paths.home().join(".claude");
                Self {
                    engine,
                    install_method: InstallMethod::Symlink,
                    commands_dir: root.join("commands"),
                    agents_dir: root.join("agents"),
                    skills_dir: root.join("skills"),
                    mcp_config_path: root.join("mcp.json"),
                    command_extension: "md",
                    installs_agents: true,
                }
            }
            Engine::Cursor => {
                let root = paths.home().join(".cursor");
                Self {
                    engine,
                    install_method: InstallMethod::Copy,
                    commands_dir: root.join("rules"),
                    agents_dir: root.join("agents"),
                    skills_dir: root.join("skills"),
                    mcp_config_path: root.join("mcp.json"),
                    command_extension: "mdc",
                    installs_agents: false,
                }
            }
        }
    }

    /// Resolve the active engine from `AGENTSTUDIO_ENGINE`, defaulting to
    /// Claude when unset or unrecognized.
    pub fn from_env(paths: &PathResolver) -> Self {
        let engine = std::env::var("AGENTSTUDIO_ENGINE")
            .ok()
            .and_then(|v| Engine::parse(&v))
            .unwrap_or(Engine::Claude);
        Self::resolve(paths, engine)
    }
}
