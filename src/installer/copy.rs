//! Copy+merge install strategy
//!
//! Skills are fully copied (existing target removed first), command files
//! are copied with the engine's extension, and MCP entries are collected
//! into the run's accumulator, then flushed once as a full-replace write
//! of the engine's `mcp.json`. The MCP config is rebuilt from scratch on
//! each full install run, never diffed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::common::fs::{CopyOptions, copy_dir_recursive, remove_dir_if_exists};
use crate::engine::EngineConfig;
use crate::error::{Result, fs as fs_err};
use crate::installer::mcp::{self, McpAccumulator};
use crate::installer::{InstallOutcome, InstallStrategy};
use crate::parser::{self, Component, ComponentType, ParsedPlugin};

/// Fallback MCP entry file when the manifest declares no `cursorEntry`
const DEFAULT_ENTRY_FILE: &str = "dist/index.js";

pub struct CopyInstaller {
    engine: EngineConfig,
}

impl CopyInstaller {
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
            ComponentType::Agent => self
                .engine
                .installs_agents
                .then(|| self.engine.agents_dir.join(format!("{}.md", component.name))),
            ComponentType::Skill => Some(self.engine.skills_dir.join(&component.name)),
            ComponentType::Hook | ComponentType::McpServer => None,
        }
    }

    /// MCP entries on the copy engine are proxied through this process's
    /// own executable, pointing at the plugin's entry file.
    fn proxy_mcp_entry(&self, plugin: &ParsedPlugin, declared: &serde_json::Value) -> serde_json::Value {
        let executable = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());
        let entry_file = plugin
            .manifest
            .cursor_entry
            .as_deref()
            .unwrap_or(DEFAULT_ENTRY_FILE);
        let entry_path = plugin.root.join(entry_file);

        let mut entry = serde_json::Map::new();
        entry.insert("command".to_string(), serde_json::Value::String(executable));
        entry.insert(
            "args".to_string(),
            serde_json::json!([entry_path.display().to_string()]),
        );
        if let Some(env) = declared.get("env") {
            entry.insert("env".to_string(), env.clone());
        }
        serde_json::Value::Object(entry)
    }

    fn collect_mcp_entries(&self, plugin: &ParsedPlugin, mcp: &mut McpAccumulator) {
        match parser::mcp_server_entries(&plugin.root) {
            Ok(servers) => {
                for (name, declared) in servers {
                    mcp.insert(name, self.proxy_mcp_entry(plugin, &declared));
                }
            }
            Err(e) => warn!(plugin = %plugin.manifest.name, error = %e, "skipping MCP entries"),
        }
    }
}

fn copy_component(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
    }
    if source.is_dir() {
        remove_dir_if_exists(target).map_err(|e| fs_err::write_failed(target, &e))?;
        copy_dir_recursive(source, target, &CopyOptions::default())
            .map_err(|e| fs_err::write_failed(target, &e))?;
    } else {
        fs::copy(source, target).map_err(|e| fs_err::write_failed(target, &e))?;
    }
    Ok(())
}

impl InstallStrategy for CopyInstaller {
    fn install(&self, plugin: &ParsedPlugin, mcp: &mut McpAccumulator) -> Result<InstallOutcome> {
        let mut outcome = InstallOutcome::default();
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            copy_component(&component.path, &target)?;
            outcome.components += 1;
        }
        if plugin
            .components
            .iter()
            .any(|c| c.component_type == ComponentType::McpServer)
        {
            self.collect_mcp_entries(plugin, mcp);
        }
        Ok(outcome)
    }

    fn uninstall(&self, plugin: &ParsedPlugin) -> Result<()> {
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            if target.is_dir() {
                remove_dir_if_exists(&target).map_err(|e| fs_err::write_failed(&target, &e))?;
            } else if target.exists() {
                fs::remove_file(&target).map_err(|e| fs_err::write_failed(&target, &e))?;
            }
        }
        // The MCP config is a whole-file replacement unit on this engine;
        // it is rebuilt by the next full install run.
        Ok(())
    }

    fn is_installed(&self, plugin: &ParsedPlugin) -> Result<bool> {
        for component in &plugin.components {
            let Some(target) = self.target_for(component) else {
                continue;
            };
            if !target.exists() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Wipe the skills directory and delete marketplace-authored command
    /// files, identified by a name containing `-` with the engine's
    /// extension.
    fn clean_before_install(&self) -> Result<()> {
        remove_dir_if_exists(&self.engine.skills_dir)
            .map_err(|e| fs_err::write_failed(&self.engine.skills_dir, &e))?;
        fs::create_dir_all(&self.engine.skills_dir)
            .map_err(|e| fs_err::write_failed(&self.engine.skills_dir, &e))?;

        if !self.engine.commands_dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.engine.commands_dir)
            .map_err(|e| fs_err::read_failed(&self.engine.commands_dir, &e))?
        {
            let entry = entry.map_err(crate::error::AgentStudioError::from)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let has_extension =
                path.extension().and_then(|e| e.to_str()) == Some(self.engine.command_extension);
            if name.contains('-') && has_extension {
                fs::remove_file(&path).map_err(|e| fs_err::write_failed(&path, &e))?;
            }
        }
        Ok(())
    }

    fn flush_mcp_config(&self, mcp: &McpAccumulator) -> Result<()> {
        mcp::write_shared_config(&self.engine.mcp_config_path, mcp.servers())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::parser::PluginParser;
    use crate::paths::PathResolver;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture_plugin(home: &Path, name: &str, server: &str) -> ParsedPlugin {
        let root = home.join("sources").join(name);
        write(
            &root,
            ".claude-plugin/plugin.json",
            &format!(r#"{{"name": "{name}", "description": "Test", "cursorEntry": "server/main.js"}}"#),
        );
        write(&root, &format!("commands/{name}-deploy.md"), "Deploys");
        write(&root, &format!("skills/{name}-skill/SKILL.md"), "A skill");
        write(&root, &format!("skills/{name}-skill/helper.py"), "print()");
        write(
            &root,
            ".mcp.json",
            &format!(r#"{{"mcpServers": {{"{server}": {{"command": "node", "env": {{"KEY": "1"}}}}}}}}"#),
        );

        let paths = PathResolver::new(home);
        let mut plugin = PluginParser::new(&paths)
            .parse_plugin(&root, None, None)
            .unwrap();
        plugin.marketplace = Some("builtin".to_string());
        plugin
    }

    fn installer(home: &Path) -> CopyInstaller {
        let paths = PathResolver::new(home);
        CopyInstaller::new(EngineConfig::resolve(&paths, Engine::Cursor))
    }

    #[test]
    fn test_install_copies_components() {
        let temp = TempDir::new().unwrap();
        let plugin = fixture_plugin(temp.path(), "alpha", "alpha-server");
        let installer = installer(temp.path());
        let mut acc = McpAccumulator::default();

        installer.install(&plugin, &mut acc).unwrap();

        let command = temp.path().join(".cursor/rules/alpha-deploy.mdc");
        assert!(command.is_file());
        assert!(!fs::symlink_metadata(&command).unwrap().file_type().is_symlink());
        assert!(temp.path().join(".cursor/skills/alpha-skill/SKILL.md").is_file());
        assert!(temp.path().join(".cursor/skills/alpha-skill/helper.py").is_file());
        assert!(installer.is_installed(&plugin).unwrap());

        // Entries accumulate; nothing is written until the flush.
        assert_eq!(acc.len(), 1);
        assert!(!temp.path().join(".cursor/mcp.json").exists());
    }

    #[test]
    fn test_mcp_entries_are_proxied_through_own_executable() {
        let temp = TempDir::new().unwrap();
        let plugin = fixture_plugin(temp.path(), "alpha", "alpha-server");
        let installer = installer(temp.path());
        let mut acc = McpAccumulator::default();

        installer.install(&plugin, &mut acc).unwrap();
        installer.flush_mcp_config(&acc).unwrap();

        let servers = mcp::read_shared_config(&temp.path().join(".cursor/mcp.json")).unwrap();
        let entry = &servers["alpha-server"];
        let args = entry["args"].as_array().unwrap();
        assert!(args[0].as_str().unwrap().ends_with("server/main.js"));
        assert_eq!(entry["env"]["KEY"], "1");
    }

    #[test]
    fn test_reinstall_with_clean_yields_no_duplicates() {
        let temp = TempDir::new().unwrap();
        let plugin = fixture_plugin(temp.path(), "alpha", "alpha-server");
        let installer = installer(temp.path());

        for _ in 0..2 {
            installer.clean_before_install().unwrap();
            let mut acc = McpAccumulator::default();
            installer.install(&plugin, &mut acc).unwrap();
            installer.flush_mcp_config(&acc).unwrap();
        }

        let servers = mcp::read_shared_config(&temp.path().join(".cursor/mcp.json")).unwrap();
        assert_eq!(servers.len(), 1);
        assert!(servers.contains_key("alpha-server"));
    }

    #[test]
    fn test_clean_before_install_heuristic() {
        let temp = TempDir::new().unwrap();
        let installer = installer(temp.path());

        write(temp.path(), ".cursor/rules/market-rule.mdc", "from marketplace");
        write(temp.path(), ".cursor/rules/local.mdc", "user rule, no dash");
        write(temp.path(), ".cursor/rules/notes-draft.md", "wrong extension");
        write(temp.path(), ".cursor/skills/old-skill/SKILL.md", "stale");

        installer.clean_before_install().unwrap();

        assert!(!temp.path().join(".cursor/rules/market-rule.mdc").exists());
        assert!(temp.path().join(".cursor/rules/local.mdc").exists());
        assert!(temp.path().join(".cursor/rules/notes-draft.md").exists());
        assert!(!temp.path().join(".cursor/skills/old-skill").exists());
        assert!(temp.path().join(".cursor/skills").is_dir());
    }

    #[test]
    fn test_uninstall_removes_copies_but_not_mcp_file() {
        let temp = TempDir::new().unwrap();
        let plugin = fixture_plugin(temp.path(), "alpha", "alpha-server");
        let installer = installer(temp.path());
        let mut acc = McpAccumulator::default();

        installer.install(&plugin, &mut acc).unwrap();
        installer.flush_mcp_config(&acc).unwrap();
        installer.uninstall(&plugin).unwrap();

        assert!(!temp.path().join(".cursor/rules/alpha-deploy.mdc").exists());
        assert!(!temp.path().join(".cursor/skills/alpha-skill").exists());
        // The merged MCP file is a whole-file unit; uninstall leaves it.
        assert!(temp.path().join(".cursor/mcp.json").exists());
        assert!(!installer.is_installed(&plugin).unwrap());
    }

    #[test]
    fn test_agents_not_installed_on_copy_engine() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("sources/agenty");
        write(
            &root,
            ".claude-plugin/plugin.json",
            r#"{"name": "agenty", "description": "Has agents"}"#,
        );
        write(&root, "agents/helper.md", "An agent");

        let paths = PathResolver::new(temp.path());
        let plugin = PluginParser::new(&paths)
            .parse_plugin(&root, None, None)
            .unwrap();
        let installer = installer(temp.path());

        let outcome = installer
            .install(&plugin, &mut McpAccumulator::default())
            .unwrap();
        assert_eq!(outcome.components, 0);
        assert!(!temp.path().join(".cursor/agents").exists());
    }
}
