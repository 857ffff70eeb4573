//! Assembly of normalized [`Skill`] records.
//!
//! Pure construction: all filesystem work happens before this point. Skip
//! conditions are ordinary outcomes, not errors.

use std::fmt;
use std::path::Path;

use crate::extract::{DEFAULT_CATEGORY, SkillMeta};
use crate::paths::ResolvedLocation;
use crate::types::{GENERATED_DIR_PREFIX, METADATA_FILENAME, RepoCoordinate, Skill};

/// Result of processing one candidate metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A normalized record was produced.
    Built(Skill),
    /// The file was intentionally not a skill.
    Skipped(SkipReason),
    /// The file could not be read or processed; the scan continues.
    Failed(String),
}

/// Why a candidate file produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The filename is not exactly the recognized metadata filename.
    NotSkillFile,
    /// The containing directory is a self-generated cache directory.
    GeneratedDirectory,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSkillFile => write!(f, "file is not named {METADATA_FILENAME}"),
            Self::GeneratedDirectory => {
                write!(f, "directory carries the {GENERATED_DIR_PREFIX} cache prefix")
            }
        }
    }
}

/// Checks the skip rules for a candidate file path.
pub fn skip_reason(file_path: &Path) -> Option<SkipReason> {
    if file_path.file_name().and_then(|n| n.to_str()) != Some(METADATA_FILENAME) {
        return Some(SkipReason::NotSkillFile);
    }
    let dir_name = file_path
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if dir_name.starts_with(GENERATED_DIR_PREFIX) {
        return Some(SkipReason::GeneratedDirectory);
    }
    None
}

/// Assembles a [`Skill`] from extracted metadata and resolved paths.
///
/// The name falls back to the display directory when empty, and an empty
/// category is floored to the default.
pub fn build_skill(meta: SkillMeta, location: &ResolvedLocation, coord: &RepoCoordinate) -> Skill {
    let name = if meta.name.is_empty() {
        location.directory.clone()
    } else {
        meta.name
    };
    let category = if meta.category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        meta.category
    };

    Skill {
        id: format!("{}:{}", coord.marketplace_id(), location.source_directory),
        name,
        description: meta.description,
        category,
        tags: meta.tags,
        marketplace_id: coord.marketplace_id(),
        repo_owner: coord.owner.clone(),
        repo_name: coord.name.clone(),
        repo_branch: coord.branch.clone(),
        directory: location.directory.clone(),
        readme_url: format!(
            "https://github.com/{}/{}/tree/{}/{}",
            coord.owner, coord.name, coord.branch, location.repo_relative_path
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn coord() -> RepoCoordinate {
        RepoCoordinate::new("acme", "repo1", "main")
    }

    fn nested_location() -> ResolvedLocation {
        ResolvedLocation {
            source_directory: "skills/alpha".to_string(),
            repo_relative_path: "skills/alpha".to_string(),
            directory: "alpha".to_string(),
        }
    }

    #[test]
    fn builds_full_record() {
        let meta = SkillMeta {
            name: "Alpha".to_string(),
            description: "Does things".to_string(),
            category: "Tools".to_string(),
            tags: vec!["a".to_string()],
        };
        let skill = build_skill(meta, &nested_location(), &coord());
        assert_eq!(skill.id, "acme/repo1:skills/alpha");
        assert_eq!(skill.name, "Alpha");
        assert_eq!(skill.marketplace_id, "acme/repo1");
        assert_eq!(skill.directory, "alpha");
        assert_eq!(
            skill.readme_url,
            "https://github.com/acme/repo1/tree/main/skills/alpha"
        );
    }

    #[test]
    fn empty_name_falls_back_to_directory() {
        let skill = build_skill(SkillMeta::default(), &nested_location(), &coord());
        assert_eq!(skill.name, "alpha");
    }

    #[test]
    fn empty_category_is_floored() {
        let meta = SkillMeta {
            category: String::new(),
            ..SkillMeta::default()
        };
        let skill = build_skill(meta, &nested_location(), &coord());
        assert_eq!(skill.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn root_level_record_keys_on_dot() {
        let location = ResolvedLocation {
            source_directory: ".".to_string(),
            repo_relative_path: ".".to_string(),
            directory: "repo1".to_string(),
        };
        let skill = build_skill(SkillMeta::default(), &location, &coord());
        assert_eq!(skill.id, "acme/repo1:.");
        assert_eq!(skill.directory, "repo1");
        assert_eq!(skill.readme_url, "https://github.com/acme/repo1/tree/main/.");
    }

    #[test]
    fn wrong_filename_is_skipped() {
        let path = PathBuf::from("/tmp/repo/alpha/skill.md");
        assert_eq!(skip_reason(&path), Some(SkipReason::NotSkillFile));
        let path = PathBuf::from("/tmp/repo/alpha/README.md");
        assert_eq!(skip_reason(&path), Some(SkipReason::NotSkillFile));
    }

    #[test]
    fn generated_directory_is_skipped() {
        let path = PathBuf::from("/tmp/repo/cam_cache/SKILL.md");
        assert_eq!(skip_reason(&path), Some(SkipReason::GeneratedDirectory));
    }

    #[test]
    fn exact_match_passes() {
        let path = PathBuf::from("/tmp/repo/alpha/SKILL.md");
        assert_eq!(skip_reason(&path), None);
    }
}
