//! AgentStudio plugin marketplace management
//!
//! Discovers, fetches, installs, enables/disables, and resynchronizes a
//! catalog of marketplaces (git/GitHub repos, local directories,
//! object-storage archives, HTTP archives) whose contents are plugins
//! composed of typed components: commands, agents, skills, hooks, and MCP
//! server declarations.
//!
//! Filesystem presence is the only installed-state store: a component is
//! installed exactly when its symlink or copy exists at the engine's
//! canonical target path. The HTTP route layer of the surrounding
//! application consumes this crate's operations and result types; the
//! bundled `agentstudio` binary exposes the same operations on the
//! command line.

pub mod agents;
pub mod archive;
pub mod cli;
pub mod commands;
pub mod common;
pub mod engine;
pub mod error;
pub mod git;
pub mod installer;
pub mod marketplace;
pub mod parser;
pub mod paths;
pub mod sync_service;
pub mod temp;

pub use error::{AgentStudioError, Result};
