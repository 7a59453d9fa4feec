//! Listing the repositories a BitBucket user owns.

use failure::{Error, ResultExt};
use serde_json;

use config::Target;
use utils;
use {Provider, Repo};

/// The hostname the public BitBucket API lives on.
pub const DEFAULT_HOST: &'static str = "bitbucket.org";

/// An interface to the repositories stored on BitBucket.
#[derive(Debug, Clone)]
pub struct BitBucket {
    host: String,
}

impl BitBucket {
    /// Create a `BitBucket` which talks to `bitbucket.org`.
    pub fn new() -> BitBucket {
        BitBucket::with_host(DEFAULT_HOST)
    }

    /// Use a different host (e.g. a self-hosted instance).
    pub fn with_host<S: Into<String>>(host: S) -> BitBucket {
        BitBucket { host: host.into() }
    }

    fn listing_url(&self, target: &Target) -> String {
        format!(
            "https://{}:{}@{}/api/2.0/repositories/{}?page=1&pagelen=100",
            target.entity,
            target.password_str(),
            self.host,
            target.entity
        )
    }
}

impl Provider for BitBucket {
    fn name(&self) -> &str {
        "bitbucket"
    }

    fn fetch_listing(&self, target: &Target) -> Result<Vec<u8>, Error> {
        let body = utils::http_get(&self.listing_url(target), target.password_str())
            .context("Unable to retrieve the repository listing")?;

        Ok(body)
    }

    fn parse_listing(&self, body: &[u8], target: &Target) -> Result<Vec<Repo>, Error> {
        let listing: Listing = serde_json::from_slice(body)
            .context("The response wasn't shaped like a BitBucket repository page")?;

        listing
            .values
            .into_iter()
            .map(|repo| repo.into_repo(target))
            .collect()
    }
}

/// The envelope BitBucket wraps every paginated response in.
#[derive(Debug, Clone, Deserialize)]
struct Listing {
    values: Vec<RawRepo>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRepo {
    name: String,
    links: Links,
}

#[derive(Debug, Clone, Deserialize)]
struct Links {
    clone: Vec<CloneLink>,
}

#[derive(Debug, Clone, Deserialize)]
struct CloneLink {
    name: String,
    href: String,
}

impl RawRepo {
    /// Find the HTTPS clone link and splice the password into it.
    ///
    /// BitBucket hands the URL back as `https://<user>@...`; that prefix is
    /// rewritten to `https://<user>:<password>@...`, first occurrence only.
    /// An unexpected prefix passes through untouched and authentication
    /// fails later, at clone time.
    fn into_repo(self, target: &Target) -> Result<Repo, Error> {
        let name = self.name;

        let href = self
            .links
            .clone
            .into_iter()
            .find(|link| link.name == "https")
            .map(|link| link.href)
            .ok_or_else(|| MissingCloneLink { repo: name.clone() })?;

        let plain = format!("https://{}@", target.entity);
        let with_password = format!("https://{}:{}@", target.entity, target.password_str());

        Ok(Repo {
            name: name,
            url: href.replacen(&plain, &with_password, 1),
        })
    }
}

/// A listing entry with no `"https"` clone link.
///
/// Without one the repository can never be cloned, so the whole listing is
/// rejected instead of silently dropping the entry.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Repository \"{}\" has no \"https\" clone link", repo)]
pub struct MissingCloneLink {
    pub repo: String,
}
