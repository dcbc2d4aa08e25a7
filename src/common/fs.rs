//! Common file system operations with unified error handling

use std::fs;
use std::path::Path;

/// Options controlling recursive directory copies
#[derive(Default, Clone)]
pub struct CopyOptions {
    /// Entry names skipped everywhere in the tree
    pub exclude: Vec<String>,
    /// Skip dotfile entries, except those listed in `keep_hidden`
    pub skip_hidden: bool,
    /// Hidden entry names still copied when `skip_hidden` is set
    pub keep_hidden: Vec<String>,
}

impl CopyOptions {
    pub fn exclude_git() -> Self {
        Self {
            exclude: vec![".git".to_string()],
            ..Self::default()
        }
    }

    /// Copy rules for importing a local marketplace source tree:
    /// `.git` and `node_modules` are skipped, dotfiles are skipped except
    /// `.claude-plugin` and `.mcp.json`.
    pub fn marketplace_source() -> Self {
        Self {
            exclude: vec![".git".to_string(), "node_modules".to_string()],
            skip_hidden: true,
            keep_hidden: vec![".claude-plugin".to_string(), ".mcp.json".to_string()],
        }
    }

    fn skips(&self, file_name: &str) -> bool {
        if self.exclude.iter().any(|e| e == file_name) {
            return true;
        }
        if self.skip_hidden
            && file_name.starts_with('.')
            && !self.keep_hidden.iter().any(|k| k == file_name)
        {
            return true;
        }
        false
    }
}

/// Copy a directory recursively with options
pub fn copy_dir_recursive<P1, P2>(src: P1, dst: P2, options: &CopyOptions) -> std::io::Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let src_ref = src.as_ref();
    let dst_ref = dst.as_ref();

    if !dst_ref.exists() {
        fs::create_dir_all(dst_ref)?;
    }

    for entry in fs::read_dir(src_ref)? {
        let entry = entry?;
        let entry_path = entry.path();
        let file_name = entry.file_name();

        if let Some(name) = file_name.to_str() {
            if options.skips(name) {
                continue;
            }
        }

        let dst_path = dst_ref.join(&file_name);

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dst_path, options)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Remove a directory tree if it exists; missing targets are not an error
pub fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}
