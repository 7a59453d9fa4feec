//! A program for keeping local mirrors of all your git repos.
//!
//! `repo-mirror` asks each configured hosting provider for the list of
//! repositories an account owns, then makes sure every one of them has an
//! up-to-date bare mirror under a single directory tree. A repository seen
//! for the first time gets a `git clone --mirror`; one which already has a
//! mirror on disk gets a pruning fetch instead, so repeated runs converge
//! on "everything up to date".
//!
//! The `Driver` ties the pieces together, but each piece is usable on its
//! own: providers implement `Provider`, the `Registry` maps a config
//! file's `source` key onto one of them, and `git::sync_repo` brings a
//! single mirror up to date.

extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate sec;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate toml;

#[cfg(test)]
extern crate tempfile;

pub mod bitbucket;
pub mod config;
pub mod driver;
pub mod git;
pub mod github;
pub mod registry;
mod utils;

pub use bitbucket::BitBucket;
pub use config::{Config, Target};
pub use driver::{Driver, UpdateFailure};
pub use git::SyncOutcome;
pub use github::GitHub;
pub use registry::Registry;

use failure::Error;

/// Something which can list the repositories an account owns on a hosting
/// provider.
///
/// Fetching and parsing are deliberately separate steps so the parsing half
/// can be exercised against canned payloads; `repositories` just glues them
/// together.
pub trait Provider {
    /// The key this provider is registered under (e.g. `"github"`).
    fn name(&self) -> &str;

    /// Issue the single listing request and hand back the raw response
    /// body.
    fn fetch_listing(&self, target: &Target) -> Result<Vec<u8>, Error>;

    /// Decode a listing response into descriptors, splicing the target's
    /// credentials into each clone URL.
    fn parse_listing(&self, body: &[u8], target: &Target) -> Result<Vec<Repo>, Error>;

    /// Fetch and decode the repository listing for one target.
    fn repositories(&self, target: &Target) -> Result<Vec<Repo>, Error> {
        let body = self.fetch_listing(target)?;
        self.parse_listing(&body, target)
    }
}

/// A repository found on a provider, ready to be mirrored.
#[derive(Debug, Clone, PartialEq)]
pub struct Repo {
    /// The repository's name, used as the final directory segment of its
    /// mirror.
    pub name: String,
    /// An HTTPS clone URL with the target's credentials embedded.
    pub url: String,
}
