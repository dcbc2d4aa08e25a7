//! Command implementations behind the CLI
//!
//! Each command gets the resolved [`Context`] (paths + engine) and its
//! parsed arguments, performs the operation through the library API, and
//! prints a human-readable summary.

pub mod completions;
pub mod marketplace;
pub mod plugin;
pub mod resync;
pub mod version;

use crate::engine::EngineConfig;
use crate::paths::PathResolver;

/// Resolved per-invocation context, computed once in `main`
pub struct Context {
    pub paths: PathResolver,
    pub engine: EngineConfig,
}
