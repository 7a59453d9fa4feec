//! Lookup from a target's declared `source` to the provider which can
//! service it.

use std::collections::HashMap;

use failure::Error;

use bitbucket::BitBucket;
use config::Target;
use github::GitHub;
use {Provider, Repo};

/// The set of known providers, keyed by the `source` value used in the
/// config file.
///
/// Teaching the program about a new provider means implementing `Provider`
/// for it and adding one `register` call here; nothing else changes.
pub struct Registry {
    providers: HashMap<String, Box<Provider>>,
}

impl Registry {
    /// Create a `Registry` with all the built-in providers registered.
    pub fn new() -> Registry {
        let mut registry = Registry {
            providers: HashMap::new(),
        };

        registry.register(Box::new(GitHub::new()));
        registry.register(Box::new(BitBucket::new()));

        registry
    }

    /// Add another provider, replacing any previous one with the same name.
    pub fn register(&mut self, provider: Box<Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Look up the provider responsible for a source type.
    ///
    /// An unrecognized source is a configuration mistake, never something
    /// worth retrying, and gets reported before any network I/O happens.
    pub fn get(&self, source: &str) -> Result<&Provider, Error> {
        match self.providers.get(source) {
            Some(provider) => Ok(&**provider),
            None => Err(UnknownSourceType {
                source: source.to_string(),
            }.into()),
        }
    }

    /// List the repositories available for one target.
    pub fn repositories(&self, target: &Target) -> Result<Vec<Repo>, Error> {
        self.get(&target.source)?.repositories(target)
    }
}

/// A `source` value that doesn't match any registered provider.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "\"{}\" is not a recognized source type", source)]
pub struct UnknownSourceType {
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bogus_target() -> Target {
        Target {
            name: String::from("typo"),
            source: String::from("sourceforge"),
            kind: String::from("users"),
            entity: String::from("whoever"),
            token: None,
            password: None,
        }
    }

    #[test]
    fn the_builtin_providers_are_registered() {
        let registry = Registry::new();

        assert_eq!(registry.get("github").unwrap().name(), "github");
        assert_eq!(registry.get("bitbucket").unwrap().name(), "bitbucket");
    }

    #[test]
    fn unknown_sources_name_the_offending_value() {
        let registry = Registry::new();

        let err = registry.get("sourceforge").unwrap_err();

        let unknown = err.downcast_ref::<UnknownSourceType>().expect("wrong error type");
        assert_eq!(unknown.source, "sourceforge");
        assert!(err.to_string().contains("\"sourceforge\""));
    }

    #[test]
    fn listing_an_unknown_source_fails_without_touching_the_network() {
        let registry = Registry::new();

        // the lookup fails before any provider (and hence any HTTP client)
        // gets involved
        let err = registry.repositories(&bogus_target()).unwrap_err();

        assert!(err.downcast_ref::<UnknownSourceType>().is_some());
    }

    #[test]
    fn third_party_providers_can_be_registered() {
        struct InHouse;

        impl Provider for InHouse {
            fn name(&self) -> &str {
                "in-house"
            }

            fn fetch_listing(&self, _target: &Target) -> Result<Vec<u8>, Error> {
                Ok(Vec::new())
            }

            fn parse_listing(&self, _body: &[u8], _target: &Target) -> Result<Vec<Repo>, Error> {
                Ok(Vec::new())
            }
        }

        let mut registry = Registry::new();
        registry.register(Box::new(InHouse));

        assert_eq!(registry.get("in-house").unwrap().name(), "in-house");
    }
}
