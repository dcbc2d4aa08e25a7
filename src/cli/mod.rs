//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command family's
//! argument types:
//! - marketplace: add/remove/sync/check/list arguments
//! - plugin: install/uninstall and skill enable/disable arguments
//! - resync: bulk resync arguments
//! - completions: shell completion arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod marketplace;
pub mod plugin;
pub mod resync;

pub use completions::CompletionsArgs;
pub use marketplace::{AddArgs, CheckArgs, ListArgs, RemoveArgs, SyncArgs};
pub use plugin::{DisableArgs, EnableArgs, InstallArgs, UninstallArgs};
pub use resync::ResyncArgs;

/// AgentStudio - plugin marketplace manager
///
/// Manage marketplaces of plugins (commands, agents, skills, hooks, MCP
/// servers) and materialize them for the active AI engine.
#[derive(Parser, Debug)]
#[command(
    name = "agentstudio",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Plugin marketplace manager for AgentStudio",
    long_about = "AgentStudio manages marketplaces of installable plugins \
                  (commands, agents, skills, hooks, MCP servers) across git, \
                  local, object-storage, and archive sources, installing them \
                  for the active AI engine.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  agentstudio add community --type github anthropics/plugins  \x1b[90m# Register a GitHub marketplace\x1b[0m\n   \
                  agentstudio install community deploy-tools                  \x1b[90m# Install one plugin\x1b[0m\n   \
                  agentstudio sync community                                  \x1b[90m# Pull marketplace updates\x1b[0m\n   \
                  agentstudio resync                                          \x1b[90m# Rebuild all builtin marketplaces\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Home directory override (data lives under <home>/.agentstudio)
    #[arg(long, global = true, env = "AGENTSTUDIO_HOME")]
    pub home: Option<PathBuf>,

    /// Active engine (claude or cursor)
    #[arg(long, global = true, env = "AGENTSTUDIO_ENGINE")]
    pub engine: Option<String>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a marketplace and fetch its content
    Add(AddArgs),

    /// Remove a marketplace, uninstalling its plugins first
    Remove(RemoveArgs),

    /// Bring a marketplace up to date with its source
    Sync(SyncArgs),

    /// Check a marketplace for upstream updates
    Check(CheckArgs),

    /// List registered marketplaces or one marketplace's plugins
    List(ListArgs),

    /// Install a plugin for the active engine
    Install(InstallArgs),

    /// Uninstall a plugin
    Uninstall(UninstallArgs),

    /// Enable a skill (or all skills) of a plugin
    Enable(EnableArgs),

    /// Disable a skill of a plugin
    Disable(DisableArgs),

    /// Resynchronize builtin marketplaces behind the sync lock
    Resync(ResyncArgs),

    /// Show the resync service status
    Status,

    /// Import the agents a marketplace declares
    ImportAgents(marketplace::ImportAgentsArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["agentstudio", "list"]).expect("should parse");
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_parsing_add() {
        let cli = Cli::try_parse_from([
            "agentstudio",
            "add",
            "community",
            "anthropics/plugins",
            "--type",
            "github",
            "--branch",
            "main",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.name, "community");
                assert_eq!(args.source, "anthropics/plugins");
                assert_eq!(args.branch.as_deref(), Some("main"));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_parsing_enable_all() {
        let cli = Cli::try_parse_from(["agentstudio", "enable", "market", "plugin", "--all"])
            .expect("should parse");
        match cli.command {
            Commands::Enable(args) => assert!(args.all),
            _ => panic!("expected enable command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["agentstudio", "frobnicate"]).is_err());
    }

    #[test]
    fn test_global_home_flag() {
        let cli = Cli::try_parse_from(["agentstudio", "--home", "/tmp/h", "status"])
            .expect("should parse");
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/h")));
    }
}
