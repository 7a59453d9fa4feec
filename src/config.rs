//! Loading and saving of `repo-mirror` settings.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use failure::{Error, ResultExt};
use sec::Secret;
use toml;

/// The settings for a whole run, usually loaded from `~/.repo-mirror.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: General,
    /// The accounts whose repositories get mirrored, in the order they're
    /// processed.
    #[serde(default, rename = "target")]
    pub targets: Vec<Target>,
}

impl Config {
    /// Load a `Config` from some file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let mut buffer = String::new();

        File::open(path)
            .context("Unable to open the config file")?
            .read_to_string(&mut buffer)
            .context("Couldn't read the config file")?;

        let cfg = toml::from_str(&buffer).context("The config file isn't valid TOML")?;
        Ok(cfg)
    }

    /// Generate an example config showing one target per provider.
    pub fn example() -> Config {
        Config {
            general: General {
                dest_dir: PathBuf::from("/srv/mirrors"),
            },
            targets: vec![
                Target {
                    name: String::from("acme"),
                    source: String::from("github"),
                    kind: String::from("orgs"),
                    entity: String::from("acme-co"),
                    token: Some(Secret::new(String::from("your API token"))),
                    password: None,
                },
                Target {
                    name: String::from("personal"),
                    source: String::from("bitbucket"),
                    kind: String::from("users"),
                    entity: String::from("some-user"),
                    token: None,
                    password: Some(Secret::new(String::from("your app password"))),
                },
            ],
        }
    }

    /// Render the config as TOML.
    pub fn as_toml(&self) -> String {
        toml::to_string(self).expect("A Config is always representable as TOML")
    }
}

/// Settings which apply to the program as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct General {
    /// The top-level directory all mirrors are placed in.
    pub dest_dir: PathBuf,
}

/// One account whose repositories get backed up as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// What to call this target's directory under `dest_dir`.
    pub name: String,
    /// Which provider hosts the repositories (a key the registry knows,
    /// e.g. `"github"`).
    pub source: String,
    /// The kind of entity on the provider (`"users"` or `"orgs"`).
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// The account or organisation name on the provider.
    pub entity: String,
    /// The API token used by token-authenticated providers (GitHub).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Secret<String>>,
    /// The password used by password-authenticated providers (BitBucket).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret<String>>,
}

impl Target {
    /// The token to authenticate with, or `""` when none was configured.
    ///
    /// An empty credential isn't an error at this level; it just ends up in
    /// the request and the provider rejects it.
    pub fn token_str(&self) -> &str {
        self.token.as_ref().map(|t| t.reveal_str()).unwrap_or("")
    }

    /// The password to authenticate with, or `""` when none was configured.
    pub fn password_str(&self) -> &str {
        self.password.as_ref().map(|p| p.reveal_str()).unwrap_or("")
    }
}

fn default_kind() -> String {
    String::from("users")
}
