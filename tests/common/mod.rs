//! Common test utilities for AgentStudio integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated home directory for integration tests
#[allow(dead_code)]
pub struct TestHome {
    /// Temporary directory backing the home
    pub temp: TempDir,
    /// Path used as AGENTSTUDIO_HOME
    pub home: PathBuf,
}

#[allow(dead_code)]
impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home).expect("Failed to create home directory");
        Self { temp, home }
    }

    /// Write a file below the temp root
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.temp.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Whether a path exists below the home directory
    pub fn home_file_exists(&self, path: &str) -> bool {
        self.home.join(path).exists()
    }

    /// Create a local marketplace source tree with the given number of
    /// plugins, each carrying one command and one skill.
    pub fn create_marketplace_source(&self, name: &str, plugins: usize) -> PathBuf {
        let source = self.temp.path().join(name);
        self.write_file(
            &format!("{name}/.claude-plugin/marketplace.json"),
            &format!(r#"{{"name": "{name}", "plugins": []}}"#),
        );
        for i in 0..plugins {
            self.write_file(
                &format!("{name}/plugin-{i}/.claude-plugin/plugin.json"),
                &format!(r#"{{"name": "plugin-{i}", "description": "Plugin {i}"}}"#),
            );
            self.write_file(
                &format!("{name}/plugin-{i}/commands/cmd-{i}.md"),
                "---\ndescription: A command\n---\n# Command",
            );
            self.write_file(
                &format!("{name}/plugin-{i}/skills/skill-{i}/SKILL.md"),
                "A skill",
            );
        }
        source
    }
}

/// Build an `agentstudio` command pinned to the test home
#[allow(dead_code)]
pub fn agentstudio_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("agentstudio").expect("binary should build");
    cmd.env("AGENTSTUDIO_HOME", home);
    cmd.env("AGENTSTUDIO_ENGINE", "claude");
    cmd.env_remove("BUILTIN_MARKETPLACES");
    cmd
}
