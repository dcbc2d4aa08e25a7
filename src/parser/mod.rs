//! Plugin parsing: manifest resolution and component discovery
//!
//! Plugins are not persisted as records; they are re-derived on every read
//! by parsing a manifest (local `plugin.json`, or one synthesized from the
//! ancestor marketplace manifest) plus a component scan.

pub mod frontmatter;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AgentStudioError, Result, plugin};
use crate::marketplace::manifest::{MarketplaceManifest, PluginEntry};
use crate::paths::{self, PathResolver};

/// How far the parser walks up looking for an ancestor marketplace manifest
const MAX_MANIFEST_WALK: usize = 5;

/// Typed plugin components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Command,
    Agent,
    Skill,
    Hook,
    McpServer,
}

/// One discovered component of a plugin
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub name: String,
    /// Absolute path: the file for commands/agents/hooks/MCP, the
    /// directory for skills
    pub path: PathBuf,
    #[serde(rename = "relativePath")]
    pub relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Normalized plugin manifest; `name` and `description` are required
#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Entry file used by the copy engine when rewriting MCP entries
    #[serde(rename = "cursorEntry", skip_serializing_if = "Option::is_none")]
    pub cursor_entry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPluginManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, rename = "cursorEntry")]
    cursor_entry: Option<String>,
}

/// Fully parsed plugin
#[derive(Debug, Clone)]
pub struct ParsedPlugin {
    pub manifest: PluginManifest,
    pub components: Vec<Component>,
    /// All files of the plugin, relative to its root
    pub files: Vec<String>,
    pub root: PathBuf,
    /// Owning marketplace, when known
    pub marketplace: Option<String>,
}

impl ParsedPlugin {
    /// Provenance tag used to scope MCP entries to this plugin
    pub fn provenance(&self) -> String {
        format!(
            "{}/{}",
            self.marketplace.as_deref().unwrap_or("local"),
            self.manifest.name
        )
    }
}

/// Parses plugin directories into normalized manifests and components
pub struct PluginParser<'a> {
    paths: &'a PathResolver,
}

impl<'a> PluginParser<'a> {
    pub fn new(paths: &'a PathResolver) -> Self {
        Self { paths }
    }

    /// Parse a plugin directory. `marketplace_name` short-circuits the
    /// ancestor walk; `plugin_name` defaults to the directory name.
    pub fn parse_plugin(
        &self,
        plugin_path: &Path,
        marketplace_name: Option<&str>,
        plugin_name: Option<&str>,
    ) -> Result<ParsedPlugin> {
        let derived_name = plugin_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let plugin_name = plugin_name.unwrap_or(&derived_name);

        let context = self.marketplace_context(plugin_path, marketplace_name)?;
        let manifest = resolve_manifest(plugin_path, plugin_name, context.as_ref())?;
        // The caller-supplied marketplace wins; a manifest found by the
        // ancestor walk names it otherwise.
        let marketplace = marketplace_name
            .map(String::from)
            .or_else(|| context.as_ref().map(|(_, name)| name.clone()));

        let declared_skills = context
            .as_ref()
            .and_then(|(m, _)| m.plugin_entry(plugin_name))
            .map(|entry| entry.skills.clone())
            .unwrap_or_default();

        let components = if declared_skills.is_empty() {
            scan_components(plugin_path)?
        } else {
            declared_skill_components(plugin_path, &declared_skills)
        };

        Ok(ParsedPlugin {
            manifest,
            components,
            files: list_files(plugin_path),
            root: plugin_path.to_path_buf(),
            marketplace,
        })
    }

    /// Locate the marketplace manifest governing this plugin: directly via
    /// the marketplace name when supplied, else by walking up parent
    /// directories. Returns the manifest and the marketplace's name.
    fn marketplace_context(
        &self,
        plugin_path: &Path,
        marketplace_name: Option<&str>,
    ) -> Result<Option<(MarketplaceManifest, String)>> {
        if let Some(name) = marketplace_name {
            let root = self.paths.marketplace_dir(name);
            return Ok(MarketplaceManifest::load_optional(&root)?
                .map(|manifest| (manifest, name.to_string())));
        }

        let mut dir = plugin_path.parent();
        for _ in 0..MAX_MANIFEST_WALK {
            let Some(current) = dir else { break };
            if let Some(manifest) = MarketplaceManifest::load_optional(current)? {
                let name = manifest.name.clone().unwrap_or_else(|| {
                    current
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                });
                return Ok(Some((manifest, name)));
            }
            dir = current.parent();
        }
        Ok(None)
    }
}

/// Read MCP server declarations from a plugin's `.mcp.json`, supporting
/// both the wrapped `{"mcpServers": {...}}` and the flat object format.
/// `$`-prefixed keys are schema noise and are filtered out.
pub fn mcp_server_entries(plugin_root: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let path = plugin_root.join(".mcp.json");
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| crate::error::fs::read_failed(&path, &e))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| AgentStudioError::PluginParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(mcp_servers_from_value(&value))
}

/// Extract the server map from a parsed `.mcp.json` value.
pub fn mcp_servers_from_value(value: &serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    let object = value
        .get("mcpServers")
        .and_then(|v| v.as_object())
        .or_else(|| value.as_object());

    object
        .map(|map| {
            map.iter()
                .filter(|(key, _)| !key.starts_with('$'))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_manifest(
    plugin_path: &Path,
    plugin_name: &str,
    context: Option<&(MarketplaceManifest, String)>,
) -> Result<PluginManifest> {
    let manifest_path = paths::plugin_manifest_path(plugin_path);
    if manifest_path.exists() {
        return read_local_manifest(&manifest_path);
    }

    if let Some((marketplace, _)) = context {
        if let Some(entry) = marketplace.plugin_entry(plugin_name) {
            return Ok(synthesize_manifest(entry, marketplace));
        }
    }

    Err(plugin::manifest_not_found(plugin_path.display().to_string()))
}

fn read_local_manifest(path: &Path) -> Result<PluginManifest> {
    let content = fs::read_to_string(path).map_err(|e| crate::error::fs::read_failed(path, &e))?;
    let raw: RawPluginManifest =
        serde_json::from_str(&content).map_err(|e| AgentStudioError::PluginParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| plugin::manifest_invalid(path.display().to_string(), "missing required field 'name'"))?;
    let description = raw
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            plugin::manifest_invalid(path.display().to_string(), "missing required field 'description'")
        })?;

    Ok(PluginManifest {
        name,
        description,
        version: raw.version,
        author: raw.author,
        cursor_entry: raw.cursor_entry,
    })
}

/// Build a manifest for a plugin with no local `plugin.json` from its
/// marketplace entry; description/version/author default from the
/// marketplace owner and metadata.
fn synthesize_manifest(entry: &PluginEntry, marketplace: &MarketplaceManifest) -> PluginManifest {
    let description = entry
        .description
        .clone()
        .or_else(|| marketplace.description.clone())
        .or_else(|| marketplace.metadata.as_ref().and_then(|m| m.description.clone()))
        .unwrap_or_default();
    let version = entry
        .version
        .clone()
        .or_else(|| marketplace.metadata.as_ref().and_then(|m| m.version.clone()));
    let author = entry
        .author
        .clone()
        .or_else(|| marketplace.owner.as_ref().and_then(|o| o.name.clone()));

    PluginManifest {
        name: entry.name.clone(),
        description,
        version,
        author,
        cursor_entry: None,
    }
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    paths
}

fn markdown_components(
    plugin_path: &Path,
    subdir: &str,
    component_type: ComponentType,
    components: &mut Vec<Component>,
) {
    for path in sorted_entries(&plugin_path.join(subdir)) {
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let description = fs::read_to_string(&path)
            .ok()
            .and_then(|content| frontmatter::extract_description(&content));
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
        components.push(Component {
            component_type,
            name: stem.to_string(),
            relative_path: format!("{subdir}/{}", file_name.unwrap_or_default()),
            path,
            description,
        });
    }
}

fn skill_components(plugin_path: &Path, components: &mut Vec<Component>) {
    for dir in sorted_entries(&plugin_path.join("skills")) {
        if !dir.is_dir() || !dir.join("SKILL.md").is_file() {
            continue;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let description = fs::read_to_string(dir.join("SKILL.md"))
            .ok()
            .and_then(|content| frontmatter::extract_description(&content));
        components.push(Component {
            component_type: ComponentType::Skill,
            name: name.to_string(),
            relative_path: format!("skills/{name}"),
            path: dir,
            description,
        });
    }
}

fn hook_components(plugin_path: &Path, components: &mut Vec<Component>) {
    let path = plugin_path.join("hooks").join("hooks.json");
    if !path.is_file() {
        return;
    }
    let Ok(content) = fs::read_to_string(&path) else {
        return;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) else {
        warn!(path = %path.display(), "skipping malformed hooks.json");
        return;
    };
    let hooks = value
        .get("hooks")
        .and_then(|v| v.as_object())
        .or_else(|| value.as_object());
    let Some(hooks) = hooks else { return };

    for event in hooks.keys() {
        components.push(Component {
            component_type: ComponentType::Hook,
            name: event.clone(),
            relative_path: "hooks/hooks.json".to_string(),
            path: path.clone(),
            description: None,
        });
    }
}

fn mcp_components(plugin_path: &Path, components: &mut Vec<Component>) {
    let path = plugin_path.join(".mcp.json");
    if !path.is_file() {
        return;
    }
    match mcp_server_entries(plugin_path) {
        Ok(servers) => {
            for name in servers.keys() {
                components.push(Component {
                    component_type: ComponentType::McpServer,
                    name: name.clone(),
                    relative_path: ".mcp.json".to_string(),
                    path: path.clone(),
                    description: None,
                });
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed .mcp.json"),
    }
}

fn scan_components(plugin_path: &Path) -> Result<Vec<Component>> {
    let mut components = Vec::new();
    markdown_components(plugin_path, "commands", ComponentType::Command, &mut components);
    markdown_components(plugin_path, "agents", ComponentType::Agent, &mut components);
    skill_components(plugin_path, &mut components);
    hook_components(plugin_path, &mut components);
    mcp_components(plugin_path, &mut components);
    Ok(components)
}

/// Skills declared in the marketplace manifest short-circuit convention
/// scanning: only the declared skills become components.
fn declared_skill_components(plugin_path: &Path, declared: &[String]) -> Vec<Component> {
    let mut components = Vec::new();
    for declared_path in declared {
        let relative = declared_path.trim_start_matches("./");
        let mut dir = plugin_path.join(relative);
        if dir.file_name().and_then(|n| n.to_str()) == Some("SKILL.md") {
            dir.pop();
        }
        if !dir.join("SKILL.md").is_file() {
            warn!(skill = %declared_path, plugin = %plugin_path.display(), "declared skill has no SKILL.md; skipping");
            continue;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let description = fs::read_to_string(dir.join("SKILL.md"))
            .ok()
            .and_then(|content| frontmatter::extract_description(&content));
        components.push(Component {
            component_type: ComponentType::Skill,
            name: name.to_string(),
            relative_path: relative.trim_end_matches("/SKILL.md").to_string(),
            path: dir,
            description,
        });
    }
    components
}

fn list_files(plugin_path: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(plugin_path)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(plugin_path)
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn plugin_fixture(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("demo-plugin");
        write(
            &root,
            ".claude-plugin/plugin.json",
            r#"{"name": "demo-plugin", "description": "Demo", "version": "1.0.0"}"#,
        );
        write(&root, "commands/deploy.md", "---\ndescription: Deploy things\n---\n# Deploy");
        write(&root, "commands/rollback.md", "# Rollback\n\nRoll the deploy back.");
        write(&root, "agents/reviewer.md", "---\ndescription: Reviews code\n---\n");
        write(&root, "skills/search/SKILL.md", "---\ndescription: Searches\n---\n");
        write(
            &root,
            "hooks/hooks.json",
            r#"{"hooks": {"PreToolUse": [{"matcher": "*"}], "PostToolUse": []}}"#,
        );
        write(
            &root,
            ".mcp.json",
            r#"{"mcpServers": {"$schema": "x", "search-server": {"command": "srv"}}}"#,
        );
        root
    }

    fn parse(root: &Path) -> ParsedPlugin {
        let paths = PathResolver::new("/nonexistent-home");
        PluginParser::new(&paths)
            .parse_plugin(root, None, None)
            .unwrap()
    }

    #[test]
    fn test_parse_full_plugin() {
        let temp = TempDir::new().unwrap();
        let root = plugin_fixture(&temp);
        let plugin = parse(&root);

        assert_eq!(plugin.manifest.name, "demo-plugin");
        assert_eq!(plugin.manifest.description, "Demo");

        let names: Vec<(ComponentType, &str)> = plugin
            .components
            .iter()
            .map(|c| (c.component_type, c.name.as_str()))
            .collect();
        assert!(names.contains(&(ComponentType::Command, "deploy")));
        assert!(names.contains(&(ComponentType::Command, "rollback")));
        assert!(names.contains(&(ComponentType::Agent, "reviewer")));
        assert!(names.contains(&(ComponentType::Skill, "search")));
        assert!(names.contains(&(ComponentType::Hook, "PreToolUse")));
        assert!(names.contains(&(ComponentType::Hook, "PostToolUse")));
        assert!(names.contains(&(ComponentType::McpServer, "search-server")));
        assert!(!names.iter().any(|(_, n)| n.starts_with('$')));
    }

    #[test]
    fn test_command_descriptions() {
        let temp = TempDir::new().unwrap();
        let root = plugin_fixture(&temp);
        let plugin = parse(&root);

        let deploy = plugin
            .components
            .iter()
            .find(|c| c.name == "deploy")
            .unwrap();
        assert_eq!(deploy.description.as_deref(), Some("Deploy things"));

        let rollback = plugin
            .components
            .iter()
            .find(|c| c.name == "rollback")
            .unwrap();
        assert_eq!(
            rollback.description.as_deref(),
            Some("Roll the deploy back.")
        );
    }

    #[test]
    fn test_manifest_missing_description_is_validation_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("broken");
        write(&root, ".claude-plugin/plugin.json", r#"{"name": "broken"}"#);

        let paths = PathResolver::new("/nonexistent-home");
        let result = PluginParser::new(&paths).parse_plugin(&root, None, None);
        assert!(matches!(result, Err(AgentStudioError::ManifestInvalid { .. })));
    }

    #[test]
    fn test_manifest_not_found() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("bare");
        fs::create_dir_all(&root).unwrap();

        let paths = PathResolver::new("/nonexistent-home");
        let result = PluginParser::new(&paths).parse_plugin(&root, None, None);
        assert!(matches!(result, Err(AgentStudioError::ManifestNotFound { .. })));
    }

    #[test]
    fn test_synthesized_manifest_from_ancestor_marketplace() {
        let temp = TempDir::new().unwrap();
        let marketplace = temp.path().join("market");
        write(
            &marketplace,
            ".claude-plugin/marketplace.json",
            r#"{
                "name": "market",
                "owner": {"name": "Team"},
                "metadata": {"version": "2.0.0"},
                "plugins": [{"name": "bare-plugin", "description": "From the manifest"}]
            }"#,
        );
        let root = marketplace.join("bare-plugin");
        write(&root, "commands/hello.md", "Says hello");

        let paths = PathResolver::new("/nonexistent-home");
        let plugin = PluginParser::new(&paths)
            .parse_plugin(&root, None, None)
            .unwrap();

        assert_eq!(plugin.manifest.name, "bare-plugin");
        assert_eq!(plugin.manifest.description, "From the manifest");
        assert_eq!(plugin.manifest.version.as_deref(), Some("2.0.0"));
        assert_eq!(plugin.manifest.author.as_deref(), Some("Team"));
        assert_eq!(plugin.marketplace.as_deref(), Some("market"));
    }

    #[test]
    fn test_declared_skills_short_circuit_scanning() {
        let temp = TempDir::new().unwrap();
        let marketplace = temp.path().join("market");
        write(
            &marketplace,
            ".claude-plugin/marketplace.json",
            r#"{
                "name": "market",
                "plugins": [{
                    "name": "skill-pack",
                    "description": "Skills only",
                    "skills": ["./skills/declared"]
                }]
            }"#,
        );
        let root = marketplace.join("skill-pack");
        write(&root, "skills/declared/SKILL.md", "---\ndescription: Declared\n---\n");
        write(&root, "skills/undeclared/SKILL.md", "Never listed");
        write(&root, "commands/ignored.md", "Ignored by declared skills");

        let paths = PathResolver::new("/nonexistent-home");
        let plugin = PluginParser::new(&paths)
            .parse_plugin(&root, None, None)
            .unwrap();

        assert_eq!(plugin.components.len(), 1);
        assert_eq!(plugin.components[0].component_type, ComponentType::Skill);
        assert_eq!(plugin.components[0].name, "declared");
    }

    #[test]
    fn test_flat_mcp_format() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("flat");
        write(
            &root,
            ".claude-plugin/plugin.json",
            r#"{"name": "flat", "description": "Flat mcp"}"#,
        );
        write(
            &root,
            ".mcp.json",
            r#"{"$schema": "x", "direct-server": {"command": "run"}}"#,
        );

        let plugin = parse(&root);
        let servers: Vec<&str> = plugin
            .components
            .iter()
            .filter(|c| c.component_type == ComponentType::McpServer)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(servers, vec!["direct-server"]);
    }

    #[test]
    fn test_provenance() {
        let temp = TempDir::new().unwrap();
        let root = plugin_fixture(&temp);
        let mut plugin = parse(&root);
        plugin.marketplace = Some("community".to_string());
        assert_eq!(plugin.provenance(), "community/demo-plugin");
    }

    #[test]
    fn test_files_listing() {
        let temp = TempDir::new().unwrap();
        let root = plugin_fixture(&temp);
        let plugin = parse(&root);
        assert!(plugin.files.contains(&"commands/deploy.md".to_string()));
        assert!(plugin
            .files
            .contains(&".claude-plugin/plugin.json".to_string()));
    }
}
