//! Core type definitions for skill scraping.

use serde::{Deserialize, Serialize};

/// The recognized metadata filename. Discovery matches on the exact name,
/// not an extension or glob.
pub const METADATA_FILENAME: &str = "SKILL.md";

/// Directory-name prefix marking self-generated cache directories.
/// Directories whose name starts with this prefix never produce a skill.
pub const GENERATED_DIR_PREFIX: &str = "cam_";

/// Coordinate of a repository to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinate {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Branch actually checked out.
    pub branch: String,
    /// Display name used for root-level skills; defaults to the repo name.
    pub display_name: String,
    /// Optional sub-path under which skills are expected to live.
    pub subpath: Option<String>,
}

impl RepoCoordinate {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, branch: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            owner: owner.into(),
            display_name: name.clone(),
            name,
            branch: branch.into(),
            subpath: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.subpath = Some(subpath.into());
        self
    }

    /// Marketplace identity: `owner/name`.
    #[must_use]
    pub fn marketplace_id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Normalized skill record produced by a scan.
///
/// Immutable after construction; a fresh scan replaces the full record set
/// for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Globally unique key: `owner/repo:source_directory`.
    pub id: String,

    /// Skill name; falls back through frontmatter, first `#` header,
    /// directory name.
    pub name: String,

    /// Description collected from frontmatter or body text.
    #[serde(default)]
    pub description: String,

    /// Category; `"Uncategorized"` is the floor value.
    pub category: String,

    /// Tags in insertion order; duplicates are not deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Owning marketplace: `owner/repo`.
    pub marketplace_id: String,

    /// Repository owner.
    pub repo_owner: String,

    /// Repository name.
    pub repo_name: String,

    /// Branch the record was scanned from.
    pub repo_branch: String,

    /// Display directory name; equals the repository display name for
    /// root-level skills.
    pub directory: String,

    /// Web-viewable link to the skill directory.
    pub readme_url: String,
}
