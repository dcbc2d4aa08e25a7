//! Archive download and extraction for COS and generic archive sources
//!
//! Downloads go through a blocking HTTP client; extraction shells out to
//! the system `tar`/`unzip`, selected by archive extension.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{AgentStudioError, Result, fetch, fs as fs_err};

fn http_client() -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("agentstudio/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Download a URL to a local file, failing on any non-success status.
pub fn download_to(url: &str, dest: &Path) -> Result<()> {
    let client = http_client()?;
    let mut response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(fetch::download_failed(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
    }
    let mut file = fs::File::create(dest).map_err(|e| fs_err::write_failed(dest, &e))?;
    response.copy_to(&mut file)?;
    Ok(())
}

/// Probe a URL with a HEAD request.
pub fn head_ok(url: &str) -> bool {
    http_client()
        .ok()
        .and_then(|client| client.head(url).send().ok())
        .is_some_and(|response| response.status().is_success())
}

/// Fetch and parse a remote JSON document.
pub fn fetch_json(url: &str) -> Result<serde_json::Value> {
    let client = http_client()?;
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(fetch::download_failed(
            url,
            format!("HTTP {}", response.status()),
        ));
    }
    let value = response.json()?;
    Ok(value)
}

/// Archive formats we know how to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveKind {
    /// Detect the archive kind from a file or URL name.
    pub fn from_name(name: &str) -> Option<ArchiveKind> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }
}

/// The trailing file name of a URL, without query or fragment.
pub fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Extract an archive into a directory via the system tar/unzip.
pub fn extract(archive: &Path, dest: &Path, kind: ArchiveKind) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| fs_err::write_failed(dest, &e))?;

    let mut command = match kind {
        ArchiveKind::TarGz => {
            let mut c = Command::new("tar");
            c.arg("-xzf").arg(archive).arg("-C").arg(dest);
            c
        }
        ArchiveKind::Tar => {
            let mut c = Command::new("tar");
            c.arg("-xf").arg(archive).arg("-C").arg(dest);
            c
        }
        ArchiveKind::Zip => {
            let mut c = Command::new("unzip");
            c.arg("-q").arg(archive).arg("-d").arg(dest);
            c
        }
    };

    let output = command.output().map_err(|e| {
        fetch::extract_failed(archive.display().to_string(), e.to_string())
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fetch::extract_failed(
            archive.display().to_string(),
            stderr.trim().to_string(),
        ));
    }

    Ok(())
}

/// Archives often wrap their content in a single top-level directory
/// (GitHub tarballs do). When the extracted tree has exactly one entry and
/// it is a directory, hoist its children up one level.
pub fn flatten_single_subdir(dir: &Path) -> Result<()> {
    let entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| fs_err::read_failed(dir, &e))?
        .collect::<std::io::Result<_>>()
        .map_err(AgentStudioError::from)?;

    if entries.len() != 1 {
        return Ok(());
    }
    let only = &entries[0];
    if !only.path().is_dir() {
        return Ok(());
    }

    let subdir = only.path();
    for child in fs::read_dir(&subdir).map_err(|e| fs_err::read_failed(&subdir, &e))? {
        let child = child.map_err(AgentStudioError::from)?;
        fs::rename(child.path(), dir.join(child.file_name()))
            .map_err(|e| fs_err::write_failed(dir, &e))?;
    }
    fs::remove_dir(&subdir).map_err(|e| fs_err::write_failed(&subdir, &e))?;
    Ok(())
}
