//! Listing the repositories a GitHub user or organisation owns.

use failure::{Error, ResultExt};
use serde_json;

use config::Target;
use utils;
use {Provider, Repo};

/// Where the public GitHub API lives.
pub const DEFAULT_API_ROOT: &'static str = "https://api.github.com";

/// An interface to the repositories stored on GitHub.
#[derive(Debug, Clone)]
pub struct GitHub {
    api_root: String,
}

impl GitHub {
    /// Create a `GitHub` which talks to the public API.
    pub fn new() -> GitHub {
        GitHub::with_api_root(DEFAULT_API_ROOT)
    }

    /// Use a different API root (e.g. a GitHub Enterprise instance).
    pub fn with_api_root<S: Into<String>>(api_root: S) -> GitHub {
        GitHub {
            api_root: api_root.into(),
        }
    }

    fn listing_url(&self, target: &Target) -> String {
        format!(
            "{}/{}/{}/repos?access_token={}&per_page=200",
            self.api_root,
            target.kind,
            target.entity,
            target.token_str()
        )
    }
}

impl Provider for GitHub {
    fn name(&self) -> &str {
        "github"
    }

    fn fetch_listing(&self, target: &Target) -> Result<Vec<u8>, Error> {
        let body = utils::http_get(&self.listing_url(target), target.token_str())
            .context("Unable to retrieve the repository listing")?;

        Ok(body)
    }

    fn parse_listing(&self, body: &[u8], target: &Target) -> Result<Vec<Repo>, Error> {
        let raw: Vec<RawRepo> = serde_json::from_slice(body)
            .context("The response wasn't shaped like a GitHub repository list")?;

        Ok(raw.into_iter().map(|repo| repo.into_repo(target)).collect())
    }
}

/// The handful of fields we care about from a GitHub repository object.
///
/// Both fields are optional on the wire; a repository missing one becomes
/// an empty string rather than sinking the whole listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRepo {
    name: String,
    clone_url: String,
}

impl RawRepo {
    /// Splice the target's credentials into the clone URL.
    ///
    /// Only the first `https://` is expanded. A URL which doesn't start
    /// with that prefix is passed through untouched, in which case
    /// authentication fails later, at clone time, rather than here.
    fn into_repo(self, target: &Target) -> Repo {
        let credentials = format!("https://{}:{}@", target.entity, target.token_str());

        Repo {
            name: self.name,
            url: self.clone_url.replacen("https://", &credentials, 1),
        }
    }
}
