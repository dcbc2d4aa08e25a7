//! Marketplace command arguments

use clap::Args;

use crate::marketplace::metadata::SourceType;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Marketplace name (sanitized to lowercase `[a-z0-9-_]`)
    pub name: String,

    /// Source locator: git URL, GitHub `owner/repo`, local path, or
    /// archive URL
    pub source: String,

    /// Source type
    #[arg(long = "type", value_enum, default_value_t = SourceType::Git)]
    pub source_type: SourceType,

    /// Branch to clone (git/github sources)
    #[arg(long)]
    pub branch: Option<String>,

    /// Object-storage bucket (cos sources)
    #[arg(long)]
    pub cos_bucket: Option<String>,

    /// Object-storage region (cos sources)
    #[arg(long)]
    pub cos_region: Option<String>,

    /// Object key of the archive inside the bucket (cos sources)
    #[arg(long)]
    pub cos_path: Option<String>,

    /// Fully resolved archive URL (cos sources; overrides bucket/region)
    #[arg(long)]
    pub cos_url: Option<String>,

    /// Enable periodic update checks
    #[arg(long)]
    pub auto_update: bool,

    /// Update check interval in seconds
    #[arg(long, requires = "auto_update")]
    pub check_interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Marketplace name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Marketplace name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Marketplace name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List this marketplace's plugins instead of all marketplaces
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportAgentsArgs {
    /// Marketplace name
    pub name: String,
}
