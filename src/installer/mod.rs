//! Component installation strategies
//!
//! Two mutually exclusive strategies implement a common contract: the
//! symlink strategy links components into the engine's directories, the
//! copy strategy materializes full copies and rebuilds the MCP config per
//! install run. The strategy is selected once from the resolved engine
//! configuration and passed by reference for the process lifetime.

pub mod copy;
pub mod mcp;
pub mod symlink;

pub use copy::CopyInstaller;
pub use mcp::{INSTALLED_BY_KEY, McpAccumulator};
pub use symlink::SymlinkInstaller;

use serde::Serialize;

use crate::engine::{EngineConfig, InstallMethod};
use crate::error::{AgentStudioError, Result};
use crate::parser::{ComponentType, ParsedPlugin};

/// Result of installing one plugin
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOutcome {
    /// Components materialized into engine directories
    pub components: usize,
}

/// Result of enabling a group of skills
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableResult {
    pub enabled_count: usize,
}

/// Common create/remove/check contract over both install mechanisms
pub trait InstallStrategy {
    /// Materialize the plugin's components. MCP entries either merge into
    /// the shared config immediately (symlink) or land in `mcp` for a
    /// later [`InstallStrategy::flush_mcp_config`] (copy).
    fn install(&self, plugin: &ParsedPlugin, mcp: &mut McpAccumulator) -> Result<InstallOutcome>;

    /// Remove the plugin's materialized components, scoped so other
    /// plugins' state is untouched.
    fn uninstall(&self, plugin: &ParsedPlugin) -> Result<()>;

    /// Whether every component of the plugin is present at its canonical
    /// target path.
    fn is_installed(&self, plugin: &ParsedPlugin) -> Result<bool>;

    /// Prepare the engine directories for a full install run.
    fn clean_before_install(&self) -> Result<()>;

    /// Write the accumulated MCP entries. Partial runs must not call this.
    fn flush_mcp_config(&self, mcp: &McpAccumulator) -> Result<()>;
}

/// Select the strategy for the active engine.
pub fn strategy_for(engine: &EngineConfig) -> Box<dyn InstallStrategy> {
    match engine.install_method {
        InstallMethod::Symlink => Box::new(SymlinkInstaller::new(engine.clone())),
        InstallMethod::Copy => Box::new(CopyInstaller::new(engine.clone())),
    }
}

fn skill_subset(plugin: &ParsedPlugin, skill: Option<&str>) -> ParsedPlugin {
    let components = plugin
        .components
        .iter()
        .filter(|c| c.component_type == ComponentType::Skill)
        .filter(|c| skill.is_none_or(|name| c.name == name))
        .cloned()
        .collect();
    ParsedPlugin {
        components,
        ..plugin.clone()
    }
}

/// Enable one skill of a plugin. Enabling an already-enabled skill is
/// idempotent and succeeds.
pub fn enable_skill(
    strategy: &dyn InstallStrategy,
    plugin: &ParsedPlugin,
    skill: &str,
) -> Result<()> {
    let subset = skill_subset(plugin, Some(skill));
    if subset.components.is_empty() {
        return Err(AgentStudioError::PluginNotFound {
            marketplace: plugin.marketplace.clone().unwrap_or_default(),
            name: format!("{}:{skill}", plugin.manifest.name),
        });
    }
    strategy.install(&subset, &mut McpAccumulator::default())?;
    Ok(())
}

/// Disable one skill of a plugin; a skill that is not enabled is a no-op.
pub fn disable_skill(
    strategy: &dyn InstallStrategy,
    plugin: &ParsedPlugin,
    skill: &str,
) -> Result<()> {
    let subset = skill_subset(plugin, Some(skill));
    strategy.uninstall(&subset)
}

/// Enable every skill of a plugin, returning how many are now enabled.
pub fn enable_all_skills(
    strategy: &dyn InstallStrategy,
    plugin: &ParsedPlugin,
) -> Result<EnableResult> {
    let subset = skill_subset(plugin, None);
    let outcome = strategy.install(&subset, &mut McpAccumulator::default())?;
    Ok(EnableResult {
        enabled_count: outcome.components,
    })
}
