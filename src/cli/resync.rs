//! Bulk resync command arguments

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ResyncArgs {
    /// Builtin marketplace paths to resync; falls back to
    /// BUILTIN_MARKETPLACES, then to all registered local marketplaces
    #[arg(long = "path")]
    pub paths: Vec<PathBuf>,
}
