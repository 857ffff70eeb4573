use crate::{Error, Result};

/// A GitHub repository reference with an optional branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRef {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
}

impl GitHubRef {
    /// Parses a GitHub web URL or an `owner/repo` shorthand.
    ///
    /// URLs may carry a `/tree/<branch>` suffix, including branch names with
    /// slashes. The branch defaults to `main` when absent.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim().trim_end_matches('/');

        let path = source
            .strip_prefix("https://github.com/")
            .or_else(|| source.strip_prefix("http://github.com/"))
            .or_else(|| {
                if source.contains("://") || source.starts_with("github.com") {
                    None
                } else {
                    Some(source)
                }
            })
            .ok_or_else(|| Error::GitHubParse(format!("not a GitHub reference: {source}")))?;

        let parts: Vec<&str> = path.split('/').collect();

        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(Error::GitHubParse(format!(
                "missing owner/repo in reference: {source}"
            )));
        }

        let owner = parts[0].to_string();
        let repo = parts[1].to_string();

        let git_ref = if parts.len() >= 4 && parts[2] == "tree" {
            parts[3..].join("/")
        } else {
            "main".to_string()
        };

        Ok(Self {
            owner,
            repo,
            git_ref,
        })
    }

    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }

    pub fn tree_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "https://github.com/{}/{}/tree/{}/{}",
            self.owner, self.repo, self.git_ref, path
        )
    }
}
