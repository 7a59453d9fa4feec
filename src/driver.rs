//! The orchestrator which walks every configured target and brings its
//! mirrors up to date.

use std::io::Write;

use failure::{Error, ResultExt};

use config::{Config, Target};
use git::{self, SyncOutcome};
use registry::Registry;
use Repo;

/// The driver for doing a full backup run.
#[derive(Debug, Clone)]
pub struct Driver {
    config: Config,
}

impl Driver {
    /// Create a new `Driver` with the provided config.
    pub fn with_config(config: Config) -> Driver {
        Driver { config }
    }

    /// Walk every target in order, mirroring each of its repositories in
    /// listing order.
    ///
    /// A target which can't even be listed (unknown source, transport
    /// trouble, a malformed response) is skipped whole; a repository whose
    /// sync fails doesn't stop its siblings. Every failure is collected and
    /// surfaced at the end as an `UpdateFailure` - nothing is retried.
    pub fn run(&self) -> Result<(), Error> {
        let registry = Registry::new();
        let mut errors = Vec::new();

        for target in &self.config.targets {
            info!("Backing up target \"{}\"", target.name);

            match self.backup_target(&registry, target) {
                Ok(failed_repos) => for (repo, e) in failed_repos {
                    errors.push((format!("{}/{}", target.name, repo.name), e));
                },
                Err(e) => {
                    warn!("Skipping \"{}\", {}", target.name, e);
                    errors.push((target.name.clone(), e));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(UpdateFailure { errors }.into())
        }
    }

    fn backup_target(
        &self,
        registry: &Registry,
        target: &Target,
    ) -> Result<Vec<(Repo, Error)>, Error> {
        let repos = registry
            .repositories(target)
            .context("Unable to fetch the repository list")?;

        info!("Found {} repos for \"{}\"", repos.len(), target.name);

        let mut failures = Vec::new();

        for repo in repos {
            match git::sync_repo(&self.config.general.dest_dir, &target.name, &repo) {
                Ok(SyncOutcome::Cloned) => info!("Cloned {}", repo.name),
                Ok(SyncOutcome::Updated) => info!("Updated {}", repo.name),
                Err(e) => {
                    warn!("Syncing {} failed, {}", repo.name, e);
                    failures.push((repo, e));
                }
            }
        }

        Ok(failures)
    }
}

/// One or more targets or repositories couldn't be backed up.
#[derive(Debug, Fail)]
#[fail(display = "One or more errors encountered while updating repos")]
pub struct UpdateFailure {
    errors: Vec<(String, Error)>,
}

impl UpdateFailure {
    /// Write out a report with one entry per failure, including each
    /// error's cause chain.
    pub fn display<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "There were {} errors updating repositories",
            self.errors.len()
        )?;

        for &(ref name, ref err) in &self.errors {
            writeln!(writer, "Error: {} failed with {}", name, err)?;
            for cause in err.causes().skip(1) {
                writeln!(writer, "\tCaused By: {}", cause)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::General;
    use failure::{err_msg, Fail};
    use std::path::PathBuf;

    #[test]
    fn a_run_with_no_targets_has_nothing_to_report() {
        let cfg = Config {
            general: General {
                dest_dir: PathBuf::from("/nowhere"),
            },
            targets: Vec::new(),
        };

        assert!(Driver::with_config(cfg).run().is_ok());
    }

    #[test]
    fn a_bad_target_is_reported_without_aborting_the_run() {
        let cfg = Config {
            general: General {
                dest_dir: PathBuf::from("/nowhere"),
            },
            targets: vec![
                Target {
                    name: String::from("typo"),
                    source: String::from("sourceforge"),
                    kind: String::from("users"),
                    entity: String::from("whoever"),
                    token: None,
                    password: None,
                },
            ],
        };

        let err = Driver::with_config(cfg).run().unwrap_err();

        let failure = err.downcast_ref::<UpdateFailure>().expect("wrong error type");
        let mut buffer = Vec::new();
        failure.display(&mut buffer).unwrap();
        let report = String::from_utf8(buffer).unwrap();

        assert!(report.contains("There were 1 errors"));
        assert!(report.contains("typo failed with"));
        assert!(report.contains("\"sourceforge\" is not a recognized source type"));
    }

    #[test]
    fn update_failures_list_every_error() {
        let errors = vec![
            ("acme".to_string(), err_msg("Unable to fetch the repository list")),
            ("acme/infra".to_string(), err_msg("`git clone` failed")),
        ];
        let failure = UpdateFailure { errors };

        let mut buffer = Vec::new();
        failure.display(&mut buffer).unwrap();
        let report = String::from_utf8(buffer).unwrap();

        assert!(report.contains("There were 2 errors"));
        assert!(report.contains("acme failed with"));
        assert!(report.contains("acme/infra failed with"));
    }

    #[test]
    fn reports_include_the_cause_chain() {
        let nested = err_msg("connection refused")
            .context("Unable to send the request")
            .context("Unable to fetch the repository list");
        let failure = UpdateFailure {
            errors: vec![("acme".to_string(), nested.into())],
        };

        let mut buffer = Vec::new();
        failure.display(&mut buffer).unwrap();
        let report = String::from_utf8(buffer).unwrap();

        assert!(report.contains("Caused By: Unable to send the request"));
        assert!(report.contains("Caused By: connection refused"));
    }
}
