//! Symlink install strategy
//!
//! One symlink per command/agent (`<name>.md`) and one per skill
//! (directory link), all placed directly in the engine's canonical
//! directories. MCP servers merge additively into the shared config,
//! tagged with their provenance so removal can be scoped per plugin.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::engine::EngineConfig;
use crate::error::{Result, fs as fs_err, install};
use crate::installer::mcp::{self, INSTALLED_BY_KEY, McpAccumulator};
use crate::installer::{InstallOutcome, InstallStrategy};
use crate::parser::{self, Component, ComponentType, ParsedPlugin};

pub struct SymlinkInstaller {
    engine: EngineConfig,
}

impl SymlinkInstaller {
    pub fn new(engine: EngineConfig) -> Self {
        Self { engine }
    }

    fn target_for(&self, component: &Component) -> Option<PathBuf> {
        match component.component_type {
            ComponentType::Command => Some(
                self.engine
                    .commands_dir
                    .join(format!("{}.{}", component.name, self.engine.command_extension)),
            ),
            ComponentType::Agent => Some(self.engine.agents_dir.join(format!("{}.md", component.name))),
            ComponentType::Skill => Some(self.engine.skills_dir.join(&component.name)),
            ComponentType::Hook | ComponentType::McpServer => None,
        }
    }

    fn merge_mcp_entries(&self, plugin: &ParsedPlugin) -> Result<()> {
        let servers = match parser::mcp_server_entries(&plugin.root) {
            Ok(servers) => servers,
            Err(e) => {
                warn!(plugin = %plugin.manifest.name, error = %e, "skipping MCP entries");
                return Ok(());
            }
        };
        if servers.is_empty() {
            return Ok(());
        }

        let provenance = plugin.provenance();
        let mut merged = mcp::read_shared_config(&self.engine.mcp_config_path)?;
        for (name, config) in servers {
            let mut entry = config.as_object().cloned().unwrap_or_default();
            entry.insert(
                INSTALLED_BY_KEY.to_string(),
                serde_json::Value::String(provenance.clone()),
            );
            merged.insert(name, serde_json::Value::Object(entry));
        }
        mcp::write_shared_config(&self.engine.mcp_config_path, &merged)
    }

    fn remove_mcp_entries(&self, plugin: &ParsedPlugin) -> Result<()> {
        if !self.engine.mcp_config_path.exists() {
            return Ok(());
        }
        let provenance = plugin.provenance();
        let mut merged = mcp::read_shared_config(&self.engine.mcp_config_path)?;
        merged.retain(|_, entry| {
            entry.get(INSTALLED_BY_KEY).and_then(|v| v.as_str()) != Some(provenance.as_str())
        });
        mcp::write_shared_config(&self.engine.mcp_config_path, &merged)
    }
}

fn make_symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, target)
    }
    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, target)
        } else {
            std::os::windows::fs::symlink_file(source, target)
        }
    }
}

/// Create `target` as a symlink to `source`. An already-correct symlink is
/// a no-op, a stale symlink is re-pointed, and a regular file or directory
/// at the target is a hard error: it is never silently overwritten.
fn ensure_symlink(source: &Path, target: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(target) {
        if !metadata.file_type().is_symlink() {
            return Err(install::target_occupied(target.display().to_string()));
        }
        match fs::read_link(target) {
            Ok(existing) if existing == source => return Ok(()),
            _ => remove_link(target)?,
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
    }
    make_symlink(source, target).map_err(|e| fs_err::write_failed(target, &e))
}

fn remove_link(target: &Path) -> Result<()> {
    fs::remove_file(target)
        .or_else(|_| fs::remove_dir(target))
        .map_err(|e| fs_err::write_failed(target, &e))
}

fn has_mcp_components(plugin: &ParsedPlugin) -> bool {
    plugin
        .components
        .iter()
        .any(|c| c.component_type == ComponentType::McpServer)
}

impl InstallStrategy for SymlinkInstaller {
    fn install(&self, plugin: &ParsedPlugin, _mcp: &mut McpAccumulator) -> Result<InstallOutcome> {
        let mut outcome = InstallOutcome::default();
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            ensure_symlink(&component.path, &target)?;
            outcome.components += 1;
        }
        // Skill-granular enables carry no MCP components; leave the
        // shared config alone for those.
        if has_mcp_components(plugin) {
            self.merge_mcp_entries(plugin)?;
        }
        Ok(outcome)
    }

    fn uninstall(&self, plugin: &ParsedPlugin) -> Result<()> {
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            if let Ok(metadata) = fs::symlink_metadata(&target) {
                if metadata.file_type().is_symlink() {
                    remove_link(&target)?;
                }
            }
        }
        if has_mcp_components(plugin) {
            self.remove_mcp_entries(plugin)?;
        }
        Ok(())
    }

    fn is_installed(&self, plugin: &ParsedPlugin) -> Result<bool> {
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            match fs::symlink_metadata(&target) {
                Ok(metadata) if metadata.file_type().is_symlink() => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    fn clean_before_install(&self) -> Result<()> {
        Ok(())
    }

    fn flush_mcp_config(&self, _mcp: &McpAccumulator) -> Result<()> {
        // Symlink installs merge additively per plugin; nothing to flush.
        Ok(())
    }
}
