//! Path resolution for discovered skill directories.
//!
//! Identity paths are always forward-slash separated, regardless of platform.

use std::path::{Path, PathBuf};

use log::warn;

use crate::types::RepoCoordinate;

/// Paths and display name derived for one skill directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Skill directory relative to the repository root, or to the configured
    /// sub-path when one applies. `"."` for the root itself.
    pub source_directory: String,
    /// Skill directory relative to the repository root, used for web links.
    pub repo_relative_path: String,
    /// Display directory name; the repository display name for root-level
    /// skills.
    pub directory: String,
}

/// Finds the repository root by walking upward from the skill directory
/// looking for a `.git` entry. Falls back to the skill directory's parent
/// when no marker exists anywhere up the chain.
pub fn find_repo_root(skill_dir: &Path) -> PathBuf {
    if skill_dir.join(".git").exists() {
        return skill_dir.to_path_buf();
    }
    for parent in skill_dir.ancestors().skip(1) {
        if parent.join(".git").exists() {
            return parent.to_path_buf();
        }
    }
    skill_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| skill_dir.to_path_buf())
}

/// Resolves identity and display paths for a skill directory.
///
/// A configured sub-path narrows `source_directory` only; failure to
/// re-express against it is logged and the root-relative value kept.
pub fn resolve_location(skill_dir: &Path, coord: &RepoCoordinate) -> ResolvedLocation {
    let root = find_repo_root(skill_dir);

    let dir_name = skill_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| coord.display_name.clone());

    let repo_relative_path =
        relative_slash_path(skill_dir, &root).unwrap_or_else(|| dir_name.clone());

    let mut source_directory = repo_relative_path.clone();
    if let Some(subpath) = &coord.subpath {
        let base = root.join(subpath.trim_matches('/'));
        match relative_slash_path(skill_dir, &base) {
            Some(rel) => source_directory = rel,
            None => warn!(
                "skill directory {} is not under sub-path {subpath}",
                skill_dir.display()
            ),
        }
    }

    let directory = if skill_dir == root {
        coord.display_name.clone()
    } else {
        dir_name
    };

    ResolvedLocation {
        source_directory,
        repo_relative_path,
        directory,
    }
}

/// Relativizes `dir` against `base` with forward slashes; `"."` when they
/// are the same directory.
fn relative_slash_path(dir: &Path, base: &Path) -> Option<String> {
    let rel = dir.strip_prefix(base).ok()?;
    if rel.as_os_str().is_empty() {
        return Some(".".to_string());
    }
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
