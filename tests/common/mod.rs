//! Shared test utilities for E2E tests.
//!
//! This module provides a temp-directory fixture with helpers for building
//! small git repos and a command builder for the `repo-manager` binary.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = TestFixture::new();
//!     fixture.init_repo("home/notes");
//!     fixture.command().arg("scan").arg("home").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::git_available;
    pub use super::TestFixture;
}

/// Whether a `git` binary can be run. Tests that need real repos return
/// early without it.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A temporary directory to build repos and config trees in.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new();
/// let upstream = fixture.init_repo("upstream/tools");
/// fixture.clone_repo(&upstream, "home/tools");
/// fixture.with_file("home/tools/new.txt", "untracked");
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(&self, path: &str, content: &str) -> &Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create a directory (and its parents).
    pub fn with_dir(&self, path: &str) -> &Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `path` inside the fixture.
    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Run git in `dir`, panicking with its output on failure.
    pub fn git(&self, dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=Repo Manager Tests",
                "-c",
                "user.email=tests@example.com",
                "-c",
                "init.defaultBranch=main",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .env("LC_ALL", "C")
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed in {}:\n{}",
            args,
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// `git init` a repo at `path` with one commit. Returns its absolute path.
    pub fn init_repo(&self, path: &str) -> PathBuf {
        let dir = self.join(path);
        std::fs::create_dir_all(&dir).expect("Failed to create repo directory");
        self.git(&dir, &["init", "-q"]);
        std::fs::write(dir.join("README.md"), "# test\n").expect("Failed to write README");
        self.git(&dir, &["add", "README.md"]);
        self.git(&dir, &["commit", "-q", "-m", "Initial commit"]);
        dir
    }

    /// `git init` a repo at `path` without any commit.
    #[allow(dead_code)]
    pub fn init_empty_repo(&self, path: &str) -> PathBuf {
        let dir = self.join(path);
        std::fs::create_dir_all(&dir).expect("Failed to create repo directory");
        self.git(&dir, &["init", "-q"]);
        dir
    }

    /// Clone `source` into `path`. Returns the clone's absolute path.
    #[allow(dead_code)]
    pub fn clone_repo(&self, source: &Path, path: &str) -> PathBuf {
        let dest = self.join(path);
        let source = source.to_string_lossy();
        let dest_arg = dest.to_string_lossy();
        self.git(self.path(), &["clone", "-q", &source, &dest_arg]);
        dest
    }

    /// Create a command running in this fixture's directory, colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-manager");
        cmd.current_dir(self.path()).env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new();
        fixture.with_file("nested/test.txt", "hello");
        assert!(fixture.join("nested/test.txt").exists());
    }
}
