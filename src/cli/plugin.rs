//! Plugin and skill command arguments

use clap::Args;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Marketplace name
    pub marketplace: String,

    /// Plugin name
    pub plugin: String,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Marketplace name
    pub marketplace: String,

    /// Plugin name
    pub plugin: String,
}

#[derive(Args, Debug)]
pub struct EnableArgs {
    /// Marketplace name
    pub marketplace: String,

    /// Plugin name
    pub plugin: String,

    /// Skill name
    #[arg(required_unless_present = "all")]
    pub skill: Option<String>,

    /// Enable every skill of the plugin
    #[arg(long, conflicts_with = "skill")]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct DisableArgs {
    /// Marketplace name
    pub marketplace: String,

    /// Plugin name
    pub plugin: String,

    /// Skill name
    pub skill: String,
}
