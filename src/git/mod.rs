//! Git operations for marketplace sources
//!
//! This module handles:
//! - Shallow-cloning marketplace repositories (HTTPS, SSH, local paths)
//! - Updating a cloned marketplace to the remote head
//! - Detecting whether the remote has moved ahead of the local clone
//!
//! Authentication is delegated to git's native credential system via
//! [`auth::setup_auth_callbacks`].

pub mod auth;

use std::path::Path;

use git2::{FetchOptions, Oid, RemoteCallbacks, Repository, build::RepoBuilder};

use crate::error::{AgentStudioError, Result};

fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).is_absolute()
}

fn fetch_options<'cb>() -> FetchOptions<'cb> {
    let mut callbacks = RemoteCallbacks::new();
    auth::setup_auth_callbacks(&mut callbacks);
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Clone a marketplace repository to a target directory.
///
/// Remote URLs are cloned shallow (depth 1); local paths get a full clone
/// since shallow transfers are not supported for them.
pub fn clone(url: &str, target: &Path, branch: Option<&str>) -> Result<()> {
    let mut options = fetch_options();
    if !is_local_url(url) {
        options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(options);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    builder
        .clone(url, target)
        .map(|_| ())
        .map_err(|e| AgentStudioError::GitCloneFailed {
            url: url.to_string(),
            reason: e.message().to_string(),
        })
}

/// Fetch the remote head of `branch` (or the remote HEAD) into FETCH_HEAD
/// and return its commit id.
fn fetch_remote_head(repo: &Repository, branch: Option<&str>) -> Result<Oid> {
    let mut remote = repo.find_remote("origin")?;

    let refspec = match branch {
        Some(branch) => format!("refs/heads/{branch}"),
        None => "HEAD".to_string(),
    };
    remote
        .fetch(&[refspec.as_str()], Some(&mut fetch_options()), None)
        .map_err(|e| AgentStudioError::GitFetchFailed {
            reason: e.message().to_string(),
        })?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let commit = repo.reference_to_annotated_commit(&fetch_head)?;
    Ok(commit.id())
}

/// Update a cloned marketplace to the remote head (fetch + hard reset).
///
/// Marketplace clones are read-only mirrors, so a reset to the fetched
/// head is the fast-forward; local edits inside the clone are discarded.
pub fn update_to_remote_head(repo_path: &Path, branch: Option<&str>) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let remote_head = fetch_remote_head(&repo, branch)?;
    let object = repo.find_object(remote_head, None)?;
    repo.reset(&object, git2::ResetType::Hard, None)?;
    Ok(())
}

/// Whether the remote head differs from the local HEAD commit.
pub fn has_remote_update(repo_path: &Path, branch: Option<&str>) -> Result<bool> {
    let repo = Repository::open(repo_path)?;
    let remote_head = fetch_remote_head(&repo, branch)?;
    let local_head = repo.head()?.peel_to_commit()?.id();
    Ok(remote_head != local_head)
}
