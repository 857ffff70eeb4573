//! Marketplace source configuration and repository records.

use serde::Deserialize;

use crate::github::GitHubRef;
use crate::types::RepoCoordinate;
use crate::{Error, Result};

/// A configured skills source: a URL serving marketplace records.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub url: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_timeout", rename = "timeout")]
    pub timeout_secs: u64,
}

fn default_format() -> String {
    "json".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> u32 {
    999
}

fn default_timeout() -> u64 {
    30
}

/// One marketplace entry as served by a source document.
///
/// Keys are camelCase on the wire. A record identifies its repository either
/// through the `repoOwner`/`repoName` pair or through a `source` reference
/// (URL or `owner/repo` shorthand).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub repo_owner: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
    #[serde(default = "default_branch")]
    pub repo_branch: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub skills_path: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl MarketplaceRecord {
    /// Checks required fields and, when a `source` is carried, that it is a
    /// well-formed GitHub reference.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidRecord("missing id".to_string()));
        }
        if self.name.is_empty() {
            return Err(Error::InvalidRecord(format!("missing name for '{}'", self.id)));
        }
        match (&self.repo_owner, &self.repo_name, &self.source) {
            (Some(owner), Some(name), _) if !owner.is_empty() && !name.is_empty() => Ok(()),
            (_, _, Some(source)) => GitHubRef::parse(source).map(|_| ()),
            _ => Err(Error::InvalidRecord(format!(
                "missing repoOwner/repoName for '{}'",
                self.id
            ))),
        }
    }

    /// Derives the repository coordinate this record points at.
    ///
    /// Validation must have passed; an unvalidated record yields an
    /// [`Error::InvalidRecord`] here too.
    pub fn coordinate(&self) -> Result<RepoCoordinate> {
        let (owner, name, branch) = match (&self.repo_owner, &self.repo_name) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                (owner.clone(), name.clone(), self.repo_branch.clone())
            }
            _ => {
                let source = self.source.as_deref().ok_or_else(|| {
                    Error::InvalidRecord(format!("missing repoOwner/repoName for '{}'", self.id))
                })?;
                let gh = GitHubRef::parse(source)?;
                (gh.owner, gh.repo, gh.git_ref)
            }
        };

        let mut coord = RepoCoordinate::new(owner, name, branch);
        if let Some(display_name) = &self.display_name {
            coord = coord.with_display_name(display_name.clone());
        }
        if let Some(skills_path) = &self.skills_path {
            coord = coord.with_subpath(skills_path.clone());
        }
        Ok(coord)
    }
}

/// Validates that a source URL is well-formed http(s).
pub fn validate_source_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidUrl(format!("unsupported scheme '{scheme}' in {url}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_config_defaults() {
        let json = r#"{"id": "main", "url": "https://example.com/skills.json"}"#;
        let source: SourceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(source.format, "json");
        assert!(source.enabled);
        assert_eq!(source.priority, 999);
        assert_eq!(source.timeout_secs, 30);
    }

    #[test]
    fn record_parses_camel_case_keys() {
        let json = r#"{
            "id": "acme-skills",
            "name": "Acme Skills",
            "repoOwner": "acme",
            "repoName": "skills",
            "repoBranch": "develop",
            "displayName": "Acme",
            "skillsPath": "skills"
        }"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        record.validate().unwrap();

        let coord = record.coordinate().unwrap();
        assert_eq!(coord.owner, "acme");
        assert_eq!(coord.name, "skills");
        assert_eq!(coord.branch, "develop");
        assert_eq!(coord.display_name, "Acme");
        assert_eq!(coord.subpath.as_deref(), Some("skills"));
    }

    #[test]
    fn record_branch_defaults_to_main() {
        let json = r#"{"id": "x", "name": "X", "repoOwner": "o", "repoName": "r"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.repo_branch, "main");
        assert_eq!(record.coordinate().unwrap().display_name, "r");
    }

    #[test]
    fn record_resolves_source_reference() {
        let json = r#"{"id": "x", "name": "X", "source": "https://github.com/o/r/tree/dev"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        record.validate().unwrap();

        let coord = record.coordinate().unwrap();
        assert_eq!(coord.owner, "o");
        assert_eq!(coord.name, "r");
        assert_eq!(coord.branch, "dev");
    }

    #[test]
    fn record_missing_fields_fail_validation() {
        let json = r#"{"name": "X", "repoOwner": "o", "repoName": "r"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.validate(), Err(Error::InvalidRecord(_))));

        let json = r#"{"id": "x", "repoOwner": "o", "repoName": "r"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.validate(), Err(Error::InvalidRecord(_))));

        let json = r#"{"id": "x", "name": "X"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.validate(), Err(Error::InvalidRecord(_))));

        let json = r#"{"id": "x", "name": "X", "source": "not-a-reference"}"#;
        let record: MarketplaceRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.validate(), Err(Error::GitHubParse(_))));
    }

    #[test]
    fn source_url_validation() {
        assert!(validate_source_url("https://example.com/skills.json").is_ok());
        assert!(validate_source_url("http://example.com/a").is_ok());
        assert!(matches!(
            validate_source_url("ftp://example.com/a"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(validate_source_url("not a url"), Err(Error::InvalidUrl(_))));
    }
}
