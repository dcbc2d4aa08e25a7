//! Agent import: marketplace-declared agents as installable units
//!
//! Agents are declared in the marketplace manifest (or implied by an
//! `agent.json` in a top-level subdirectory). Their resolved configs are
//! written under the marketplace's own `.claude-plugin/agents/` folder and
//! linked into the shared agents directory. A user-authored agent of the
//! same id is never clobbered, and built-in agents are never removed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::common::string_utils::agent_slug;
use crate::error::{AgentStudioError, Result, agent, fs as fs_err, marketplace as mkt_err};
use crate::marketplace::manifest::{AgentDeclaration, MarketplaceManifest};
use crate::paths::PathResolver;

/// Outcome of importing a marketplace's agents
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

pub struct AgentImporter<'a> {
    paths: &'a PathResolver,
}

impl<'a> AgentImporter<'a> {
    pub fn new(paths: &'a PathResolver) -> Self {
        Self { paths }
    }

    /// Import every agent the marketplace declares. Declarations come from
    /// the manifest's `agents[]`; when that is empty, top-level
    /// subdirectories holding an `agent.json` are treated as implicit
    /// declarations.
    pub fn import_agents_from_marketplace(&self, name: &str) -> Result<ImportResult> {
        let root = self.paths.marketplace_dir(name);
        if !root.is_dir() {
            return Err(mkt_err::not_found(name));
        }

        let mut declarations = MarketplaceManifest::load_optional(&root)?
            .map(|manifest| manifest.agents)
            .unwrap_or_default();
        if declarations.is_empty() {
            declarations = implicit_declarations(&root);
        }

        let mut result = ImportResult::default();
        for declaration in &declarations {
            match self.import_one(name, &root, declaration) {
                Ok(true) => result.imported += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    warn!(marketplace = name, agent = %declaration.name, error = %e, "agent import failed");
                    result.skipped += 1;
                }
            }
        }
        Ok(result)
    }

    fn import_one(
        &self,
        marketplace: &str,
        root: &Path,
        declaration: &AgentDeclaration,
    ) -> Result<bool> {
        let mut config = self.resolve_config(root, declaration)?;
        let id = declaration
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| agent_slug(&declaration.name));

        if let Some(object) = config.as_object_mut() {
            object.insert("id".to_string(), serde_json::Value::String(id.clone()));
            object.insert(
                "name".to_string(),
                serde_json::Value::String(declaration.name.clone()),
            );
            if let Some(description) = &declaration.description {
                object
                    .entry("description")
                    .or_insert_with(|| serde_json::Value::String(description.clone()));
            }
            if let Some(version) = &declaration.version {
                object
                    .entry("version")
                    .or_insert_with(|| serde_json::Value::String(version.clone()));
            }
        }

        let shared = self.shared_agent_path(&id);
        if let Ok(metadata) = fs::symlink_metadata(&shared) {
            if !metadata.file_type().is_symlink() {
                // A local, user-authored agent owns this id.
                warn!(agent = id, "existing agent is not a symlink; refusing to overwrite");
                return Ok(false);
            }
            fs::remove_file(&shared).map_err(|e| fs_err::write_failed(&shared, &e))?;
        }

        let stored = self
            .paths
            .marketplace_agents_dir(marketplace)
            .join(format!("{id}.json"));
        if let Some(parent) = stored.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
        }
        let content = serde_json::to_string_pretty(&config)?;
        fs::write(&stored, content).map_err(|e| fs_err::write_failed(&stored, &e))?;

        if let Some(parent) = shared.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
        }
        if let Err(e) = link_agent(&stored, &shared) {
            debug!(agent = id, error = %e, "symlink failed, copying agent file instead");
            fs::copy(&stored, &shared).map_err(|e| fs_err::write_failed(&shared, &e))?;
        }
        Ok(true)
    }

    /// Resolve the agent's config from its referenced file or inline value.
    fn resolve_config(
        &self,
        root: &Path,
        declaration: &AgentDeclaration,
    ) -> Result<serde_json::Value> {
        if let Some(config) = &declaration.config {
            return Ok(config.clone());
        }
        if let Some(source) = &declaration.source {
            let path = root.join(source.trim_start_matches("./"));
            let content = fs::read_to_string(&path).map_err(|e| fs_err::read_failed(&path, &e))?;
            return serde_json::from_str(&content).map_err(|e| {
                AgentStudioError::PluginParseFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            });
        }
        Err(agent::missing_config(&declaration.name))
    }

    fn shared_agent_path(&self, id: &str) -> PathBuf {
        self.paths.shared_agents_dir().join(format!("{id}.json"))
    }

    /// Remove an imported agent from the shared directory. Only symlinks
    /// are ever removed; built-in agents are refused outright. Returns
    /// whether anything was removed.
    pub fn uninstall_agent(&self, id: &str) -> Result<bool> {
        let shared = self.shared_agent_path(id);
        let Ok(metadata) = fs::symlink_metadata(&shared) else {
            return Ok(false);
        };

        if is_builtin_agent(&shared) {
            return Err(agent::builtin_protected(id));
        }
        if !metadata.file_type().is_symlink() {
            debug!(agent = id, "agent is not a symlink; leaving it in place");
            return Ok(false);
        }
        fs::remove_file(&shared).map_err(|e| fs_err::write_failed(&shared, &e))?;
        Ok(true)
    }

    /// Remove every shared-agent link owned by this marketplace. Links to
    /// other marketplaces' agents (even under the same id) are untouched.
    pub fn uninstall_marketplace_agents(&self, name: &str) -> Result<usize> {
        let stored_dir = self.paths.marketplace_agents_dir(name);
        if !stored_dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&stored_dir).map_err(|e| fs_err::read_failed(&stored_dir, &e))? {
            let entry = entry.map_err(AgentStudioError::from)?;
            let stored = entry.path();
            if stored.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = stored.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let shared = self.shared_agent_path(id);
            if let Ok(target) = fs::read_link(&shared) {
                if target != stored {
                    continue;
                }
            }
            match self.uninstall_agent(id) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(AgentStudioError::BuiltinAgentProtected { .. }) => {
                    warn!(agent = id, "built-in agent left in place");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }
}

fn link_agent(stored: &Path, shared: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(stored, shared)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(stored, shared)
    }
}

/// Built-in agents carry a `"builtin": true` marker in their config.
fn is_builtin_agent(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|config| config.get("builtin").and_then(|v| v.as_bool()))
        .unwrap_or(false)
}

fn implicit_declarations(root: &Path) -> Vec<AgentDeclaration> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };
    let mut declarations: Vec<AgentDeclaration> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .filter(|entry| entry.path().join("agent.json").is_file())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            AgentDeclaration {
                source: Some(format!("{name}/agent.json")),
                name,
                id: None,
                config: None,
                description: None,
                version: None,
            }
        })
        .collect();
    declarations.sort_by(|a, b| a.name.cmp(&b.name));
    declarations
}
