//! Shallow repository checkouts with branch fallback.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::{Error, Result};

/// Branches tried in order when the requested branch is itself one of the
/// common defaults.
const BRANCH_FALLBACKS: [&str; 6] = ["main", "master", "develop", "development", "dev", "trunk"];

/// A GitHub repository to materialize locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepository {
    pub owner: String,
    pub name: String,
    /// Branch to clone; `None` auto-detects the remote default.
    pub branch: Option<String>,
}

/// A cloned working tree. Dropping the checkout removes it from disk.
#[derive(Debug)]
pub struct Checkout {
    _dir: TempDir,
    path: PathBuf,
    /// Branch actually checked out, which may differ from the requested one.
    pub branch: String,
}

impl Checkout {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GitRepository {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: Option<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch,
        }
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }

    /// Shallow-clones the repository into a temporary directory.
    ///
    /// The requested or detected branch is tried first. A requested `main`
    /// still goes through default-branch detection, since many repositories
    /// configured with the old assumption have moved their default.
    pub fn clone_repo(&self) -> Result<Checkout> {
        let git = which::which("git").map_err(|_| Error::GitNotFound)?;
        let url = self.url();

        let primary = match self.branch.as_deref() {
            None => self.detect_default_branch(&git),
            Some("main") => self.detect_default_branch(&git),
            Some(branch) => branch.to_string(),
        };

        let dir = tempfile::Builder::new()
            .prefix(&format!("cam_{}_", self.name))
            .tempdir()?;
        let target = dir.path().join("repo");

        let mut last_stderr = String::new();
        for branch in branch_candidates(&primary) {
            info!("cloning {url} (branch: {branch})");
            let output = Command::new(&git)
                .args(["clone", "--depth", "1", "--branch", branch.as_str(), url.as_str()])
                .arg(&target)
                .output()?;
            if output.status.success() {
                info!("cloned {}/{} on branch {branch}", self.owner, self.name);
                return Ok(Checkout {
                    _dir: dir,
                    path: target,
                    branch,
                });
            }
            last_stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("branch {branch} not available, trying next");
            let _ = fs::remove_dir_all(&target);
        }

        Err(Error::Clone {
            url,
            stderr: last_stderr,
        })
    }

    /// Asks the remote for its default branch; falls back to `main`.
    fn detect_default_branch(&self, git: &Path) -> String {
        let url = self.url();
        debug!("detecting default branch for {url}");
        let output = match Command::new(git)
            .args(["ls-remote", "--symref", url.as_str(), "HEAD"])
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                warn!("failed to detect default branch for {url}: {err}");
                return "main".to_string();
            }
        };
        if !output.status.success() {
            return "main".to_string();
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_symref_head(&stdout) {
            Some(branch) => {
                info!("detected default branch '{branch}' for {}/{}", self.owner, self.name);
                branch
            }
            None => "main".to_string(),
        }
    }
}

/// The clone order for a primary branch: the branch itself, then the
/// remaining common defaults when the primary is one of them.
fn branch_candidates(primary: &str) -> Vec<String> {
    let mut candidates = vec![primary.to_string()];
    if BRANCH_FALLBACKS.contains(&primary) {
        candidates.extend(
            BRANCH_FALLBACKS
                .iter()
                .filter(|b| **b != primary)
                .map(|b| (*b).to_string()),
        );
    }
    candidates
}

/// Parses `git ls-remote --symref <url> HEAD` output, looking for the
/// `ref: refs/heads/<branch>\tHEAD` line.
fn parse_symref_head(output: &str) -> Option<String> {
    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("ref: refs/heads/") {
            let branch = rest.split('\t').next().unwrap_or(rest).trim();
            if !branch.is_empty() {
                return Some(branch.to_string());
            }
        }
    }
    None
}
