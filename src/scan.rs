//! Recursive checkout scanning.
//!
//! A scan always completes. Per-file failures are logged and skipped, skip
//! conditions are silent outcomes, and zero results is a valid result.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::builder::{Outcome, build_skill, skip_reason};
use crate::extract::extract_metadata;
use crate::paths::resolve_location;
use crate::types::{METADATA_FILENAME, RepoCoordinate, Skill};

/// Processes one candidate metadata file into an [`Outcome`].
pub fn process_file(file_path: &Path, coord: &RepoCoordinate) -> Outcome {
    if let Some(reason) = skip_reason(file_path) {
        debug!("skipping {}: {reason}", file_path.display());
        return Outcome::Skipped(reason);
    }

    let content = match fs::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) => return Outcome::Failed(format!("read {}: {err}", file_path.display())),
    };

    let Some(skill_dir) = file_path.parent() else {
        return Outcome::Failed(format!("{} has no parent directory", file_path.display()));
    };

    let meta = extract_metadata(&content);
    let location = resolve_location(skill_dir, coord);
    Outcome::Built(build_skill(meta, &location, coord))
}

/// Walks a checkout for metadata files and collects the skills they yield.
///
/// The scan root is the checkout itself, narrowed to the coordinate's
/// sub-path when one is configured. A configured sub-path that does not
/// exist yields an empty result and a warning, not an error.
pub fn scan_checkout(coord: &RepoCoordinate, checkout: &Path) -> Vec<Skill> {
    let scan_root = match &coord.subpath {
        Some(subpath) => checkout.join(subpath.trim_matches('/')),
        None => checkout.to_path_buf(),
    };
    if !scan_root.exists() {
        warn!("sub-path not found: {}", scan_root.display());
        return Vec::new();
    }

    let mut skills = Vec::new();
    for entry in WalkDir::new(&scan_root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("walk error under {}: {err}", scan_root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != OsStr::new(METADATA_FILENAME) {
            continue;
        }
        match process_file(entry.path(), coord) {
            Outcome::Built(skill) => {
                debug!("found skill: {}", skill.id);
                skills.push(skill);
            }
            Outcome::Skipped(_) => {}
            Outcome::Failed(err) => warn!("skipped {}: {err}", entry.path().display()),
        }
    }

    info!("found {} skills in {}", skills.len(), coord.marketplace_id());
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn coord() -> RepoCoordinate {
        RepoCoordinate::new("acme", "repo1", "main")
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture_checkout() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write_file(&root.join("SKILL.md"), "# Root Skill\nTop level.\n");
        write_file(
            &root.join("skills/alpha/SKILL.md"),
            "---\nname: Alpha\ndescription: Does things\ncategory: Tools\ntags: [a, b]\n---\n",
        );
        write_file(
            &root.join("skills/beta/SKILL.md"),
            "---\ndesc: [broken\noops\n---\n# Beta Skill\nBeta description.\n",
        );
        write_file(&root.join("cam_cache/SKILL.md"), "# Cached\n");
        write_file(&root.join("docs/skill.md"), "# Lowercase\n");
        write_file(&root.join("docs/README.md"), "# Readme\n");
        tmp
    }

    #[test]
    fn scan_collects_nested_and_root_skills() {
        let tmp = fixture_checkout();
        let mut skills = scan_checkout(&coord(), tmp.path());
        skills.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<&str> = skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["acme/repo1:.", "acme/repo1:skills/alpha", "acme/repo1:skills/beta"]
        );

        let root = &skills[0];
        assert_eq!(root.name, "Root Skill");
        assert_eq!(root.directory, "repo1");

        let alpha = &skills[1];
        assert_eq!(alpha.name, "Alpha");
        assert_eq!(alpha.category, "Tools");
        assert_eq!(alpha.tags, vec!["a", "b"]);

        let beta = &skills[2];
        assert_eq!(beta.name, "Beta Skill");
        assert_eq!(beta.description, "Beta description.");
        assert_eq!(beta.category, "Uncategorized");
    }

    #[test]
    fn subpath_narrows_the_scan_root() {
        let tmp = fixture_checkout();
        let coord = coord().with_subpath("skills");
        let mut skills = scan_checkout(&coord, tmp.path());
        skills.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<&str> = skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["acme/repo1:alpha", "acme/repo1:beta"]);
        assert_eq!(
            skills[0].readme_url,
            "https://github.com/acme/repo1/tree/main/skills/alpha"
        );
    }

    #[test]
    fn missing_subpath_yields_empty_result() {
        let tmp = fixture_checkout();
        let coord = coord().with_subpath("nope");
        assert!(scan_checkout(&coord, tmp.path()).is_empty());
    }

    #[test]
    fn empty_checkout_yields_empty_result() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_checkout(&coord(), tmp.path()).is_empty());
    }

    #[test]
    fn unreadable_file_is_a_failed_outcome() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("alpha/SKILL.md");
        match process_file(&missing, &coord()) {
            Outcome::Failed(_) => {}
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn generated_directory_is_a_skipped_outcome() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cam_x/SKILL.md");
        write_file(&path, "# Cached\n");
        assert!(matches!(process_file(&path, &coord()), Outcome::Skipped(_)));
    }
}
