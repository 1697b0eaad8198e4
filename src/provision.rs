//! # Provisioning
//!
//! [`Provisioner::provision`] brings a working copy in line with a
//! [`RepoConfig`]:
//!
//! 1. Clone it when the target directory does not exist yet. An existing
//!    target must classify as a git repo of its own: a symlink or a plain
//!    subdirectory of some other checkout is refused before git runs.
//! 2. Inspect it and refuse to touch it when none of its remote URLs is one
//!    of the configured ones. This catches a stray, unrelated directory that
//!    happens to have the right name.
//! 3. Reconcile remotes: a configured remote that is missing gets added, one
//!    with a different URL gets removed and re-added.
//! 4. Pull, but only for a pre-existing repo in good health. A failed pull is
//!    reported and otherwise ignored.
//! 5. Rewrite the managed section of `.git/info/exclude`.
//! 6. Link the config's symlink source into the working copy.
//! 7. Drop dangling symlinks from the working copy.
//!
//! Every step checks before it acts, so provisioning the same repo twice in a
//! row leaves an empty [`ProvisionReport`] the second time.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::classify::{classify, PathKind};
use crate::config::{RepoConfig, REPO_JSON};
use crate::error::{Error, Result};
use crate::exclude::update_exclude_file;
use crate::node::GitStatus;
use crate::process::{Invocation, ProcessRunner};
use crate::status;
use crate::symlinks::{link_all, remove_dangling_symlinks, LinkOutcome};

/// A mutation performed while provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Cloned { url: String },
    RemoteRemoved { name: String, url: String },
    RemoteAdded { name: String, url: String },
    ExcludeUpdated,
    LinkCreated { link: PathBuf },
    LinkReplaced { link: PathBuf },
    DanglingLinkRemoved { link: PathBuf },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Cloned { url } => write!(f, "cloned {url}"),
            Change::RemoteRemoved { name, url } => write!(f, "removed remote {name} ({url})"),
            Change::RemoteAdded { name, url } => write!(f, "added remote {name} ({url})"),
            Change::ExcludeUpdated => write!(f, "updated exclude file"),
            Change::LinkCreated { link } => write!(f, "linked {}", link.display()),
            Change::LinkReplaced { link } => write!(f, "relinked {}", link.display()),
            Change::DanglingLinkRemoved { link } => {
                write!(f, "removed broken link {}", link.display())
            }
        }
    }
}

/// What a provisioning run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub changes: Vec<Change>,
    /// `None` when no pull was attempted, otherwise whether it succeeded.
    pub pulled: Option<bool>,
}

impl ProvisionReport {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Sets up working copies, running git through the given runner.
pub struct Provisioner<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: ProcessRunner + ?Sized> Provisioner<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Provision the working copy at `target` from `config`.
    pub fn provision(&self, target: &Path, config: &RepoConfig) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();

        let preexisting = fs::symlink_metadata(target).is_ok();
        if preexisting {
            ensure_git_repo(target)?;
        } else {
            self.clone_into(target, config, &mut report)?;
        }

        let status = status::inspect(self.runner, target).map_err(|source| Error::Inspect {
            path: target.to_path_buf(),
            source: Box::new(source),
        })?;
        ensure_related(target, &status, config)?;
        self.reconcile_remotes(target, &status, config, &mut report)?;
        info!(
            "{} has been set up with {} remotes",
            target.display(),
            config.remotes.len()
        );

        if preexisting && !status.is_problem() {
            report.pulled = Some(self.pull(target));
        }

        if update_exclude_file(target, &config.exclude)? {
            report.changes.push(Change::ExcludeUpdated);
        }

        if let Some(source_dir) = &config.symlink_source_dir {
            for (link, outcome) in link_all(source_dir, target, &[REPO_JSON])? {
                report.changes.push(match outcome {
                    LinkOutcome::Replaced => Change::LinkReplaced { link },
                    _ => Change::LinkCreated { link },
                });
            }
        }

        for link in remove_dangling_symlinks(target)? {
            report.changes.push(Change::DanglingLinkRemoved { link });
        }

        Ok(report)
    }

    fn clone_into(
        &self,
        target: &Path,
        config: &RepoConfig,
        report: &mut ProvisionReport,
    ) -> Result<()> {
        let parent = target.parent().unwrap_or_else(|| Path::new("/"));
        if !parent.is_dir() {
            return Err(Error::precondition(format!(
                "{} does not exist",
                parent.display()
            )));
        }

        let (_, url) = config.clone_source()?;
        info!("Cloning {} into {}", url, target.display());
        let target_arg = target.to_string_lossy().into_owned();
        self.runner.run(
            &Invocation::git(["clone", url, target_arg.as_str()])
                .passthrough()
                .checked(),
        )?;
        report.changes.push(Change::Cloned {
            url: url.to_string(),
        });
        Ok(())
    }

    fn reconcile_remotes(
        &self,
        target: &Path,
        status: &GitStatus,
        config: &RepoConfig,
        report: &mut ProvisionReport,
    ) -> Result<()> {
        for (name, url) in &config.remotes {
            match status.remotes.get(name) {
                Some(current) if current == url => {
                    debug!("{} already has remote {} with url {}", target.display(), name, url);
                    continue;
                }
                Some(current) => {
                    info!(
                        "Need to remove remote {} with url {} so it can be replaced with {}",
                        name, current, url
                    );
                    self.runner.run(
                        &Invocation::git(["remote", "remove", name.as_str()])
                            .current_dir(target)
                            .checked(),
                    )?;
                    report.changes.push(Change::RemoteRemoved {
                        name: name.clone(),
                        url: current.clone(),
                    });
                }
                None => {}
            }

            info!("Adding remote {} with url {}", name, url);
            self.runner.run(
                &Invocation::git(["remote", "add", name.as_str(), url.as_str()])
                    .current_dir(target)
                    .checked(),
            )?;
            report.changes.push(Change::RemoteAdded {
                name: name.clone(),
                url: url.clone(),
            });
        }
        Ok(())
    }

    fn pull(&self, target: &Path) -> bool {
        let output = match self
            .runner
            .run(&Invocation::git(["pull"]).current_dir(target).passthrough())
        {
            Ok(output) => output,
            Err(e) => {
                warn!("git pull in {} failed: {}", target.display(), e);
                return false;
            }
        };
        if !output.success() {
            warn!(
                "git pull in {} failed with exit code {}",
                target.display(),
                output.exit_code
            );
        }
        output.success()
    }
}

/// Fail unless `target` is a git working copy in its own right. git would
/// otherwise find an enclosing repo and act on that one.
fn ensure_git_repo(target: &Path) -> Result<()> {
    match classify(target)? {
        PathKind::GitRepo => Ok(()),
        _ => Err(Error::precondition(format!(
            "{} exists and is not a git repo",
            target.display()
        ))),
    }
}

/// Fail unless some current remote URL is one of the configured URLs.
fn ensure_related(target: &Path, status: &GitStatus, config: &RepoConfig) -> Result<()> {
    let related = status
        .remotes
        .values()
        .any(|current| config.remotes.values().any(|wanted| wanted == current));
    if related {
        return Ok(());
    }
    let wanted: Vec<&str> = config.remotes.values().map(String::as_str).collect();
    Err(Error::precondition(format!(
        "None of the remotes in existing repo {} match any of the specified remotes: {}",
        target.display(),
        wanted.join(" ")
    )))
}
