//! # Git Working Copy Status
//!
//! Derives a [`GitStatus`] for a working copy by running `git` and matching
//! its human-readable output:
//!
//! 1. `git status` - clean when it says `nothing to commit, working tree clean`.
//! 2. `git remote -v` - one `(name, url)` pair per line.
//! 3. `git status` again (same output) - synced when it says
//!    `Your branch is up to date with '<remote>/<branch>'.`
//! 4. When the tree is clean and has remotes but no tracking relationship
//!    says "up to date", ask git which remote-tracking branches contain
//!    `HEAD`. Any answer means the commit has been pushed somewhere.
//!
//! The phrases are git's English porcelain messages. They are a compatibility
//! surface, not a protocol; [`crate::process::SystemRunner`] pins `LC_ALL=C`
//! so translations do not break the match.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use regex::Regex;

use crate::error::Result;
use crate::node::GitStatus;
use crate::process::{Invocation, ProcessRunner};

const CLEAN_PHRASE: &str = "nothing to commit, working tree clean";
const SYNCED_PATTERN: &str = r"Your branch is up to date with '.*/.*'\.";

/// Inspect the git working copy at `path`.
///
/// `git status` and `git remote -v` must succeed; their failure aborts the
/// inspection. The commit-containment fallback is advisory and only ever
/// upgrades `synced_with_remote`.
pub fn inspect<R: ProcessRunner + ?Sized>(runner: &R, path: &Path) -> Result<GitStatus> {
    debug!("Scanning Git repo at {}...", path.display());

    let status_output = runner
        .run(&Invocation::git(["status"]).current_dir(path).checked())?
        .stdout;
    let remotes_output = runner
        .run(&Invocation::git(["remote", "-v"]).current_dir(path).checked())?
        .stdout;

    let mut status = GitStatus {
        clean_working_tree: status_output.contains(CLEAN_PHRASE),
        remotes: parse_remotes(&remotes_output),
        synced_with_remote: Regex::new(SYNCED_PATTERN)?.is_match(&status_output),
    };

    if status.clean_working_tree && status.has_remotes() && !status.synced_with_remote {
        debug!("Checking if last commit is on remote");
        status.synced_with_remote = head_is_on_remote(runner, path)?;
    }

    debug!("... Scanned {} done", path.display());
    Ok(status)
}

/// Parse `git remote -v` output into a name -> URL map.
///
/// Each remote is listed twice (fetch and push); the later line wins.
pub fn parse_remotes(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let url = fields.next()?;
            Some((name.to_string(), url.to_string()))
        })
        .collect()
}

/// Whether some remote-tracking branch contains the current commit.
/// Command failures here just mean "don't know", which reads as `false`.
fn head_is_on_remote<R: ProcessRunner + ?Sized>(runner: &R, path: &Path) -> Result<bool> {
    let head = runner.run(&Invocation::git(["rev-parse", "HEAD"]).current_dir(path));
    let commit = match head {
        Ok(output) if output.success() => output.stdout.trim().to_string(),
        _ => return Ok(false),
    };
    if commit.is_empty() {
        return Ok(false);
    }

    let containing = runner.run(
        &Invocation::git(["branch", "-r", "--contains", commit.as_str()]).current_dir(path),
    );
    Ok(match containing {
        Ok(output) => output.success() && !output.stdout.trim().is_empty(),
        Err(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::process::testing::ScriptedRunner;

    const CLEAN_SYNCED: &str = "On branch main\n\
        Your branch is up to date with 'origin/main'.\n\n\
        nothing to commit, working tree clean\n";
    const CLEAN_UNTRACKED_BRANCH: &str = "On branch main\n\
        nothing to commit, working tree clean\n";
    const DIRTY: &str = "On branch main\n\
        Untracked files:\n  (use \"git add <file>...\" to include in what will be committed)\n\
        \tnew_file.txt\n\n\
        nothing added to commit but untracked files present (use \"git add\" to track)\n";
    const ORIGIN: &str = "origin\t/srv/upstream.git (fetch)\n\
        origin\t/srv/upstream.git (push)\n";

    #[test]
    fn test_clean_synced_repo_is_not_a_problem() {
        let runner = ScriptedRunner::new()
            .ok("git status", CLEAN_SYNCED)
            .ok("git remote -v", ORIGIN);
        let status = inspect(&runner, Path::new("/repo")).unwrap();

        assert!(status.clean_working_tree);
        assert!(status.synced_with_remote);
        assert_eq!(status.remotes["origin"], "/srv/upstream.git");
        assert!(!status.is_problem());
        // No fallback needed
        assert_eq!(runner.command_lines(), vec!["git status", "git remote -v"]);
    }

    #[test]
    fn test_commands_run_inside_the_repo() {
        let runner = ScriptedRunner::new().ok("git status", CLEAN_SYNCED);
        inspect(&runner, Path::new("/work/repo")).unwrap();
        for call in runner.calls.borrow().iter() {
            assert_eq!(call.cwd.as_deref(), Some(Path::new("/work/repo")));
        }
    }

    #[test]
    fn test_dirty_repo_without_remotes() {
        let runner = ScriptedRunner::new().ok("git status", DIRTY);
        let status = inspect(&runner, Path::new("/repo")).unwrap();

        assert!(!status.clean_working_tree);
        assert!(!status.has_remotes());
        assert!(!status.synced_with_remote);
        assert!(status.is_problem());
        assert_eq!(runner.command_lines().len(), 2);
    }

    #[test]
    fn test_fallback_marks_pushed_commit_as_synced() {
        let runner = ScriptedRunner::new()
            .ok("git status", CLEAN_UNTRACKED_BRANCH)
            .ok("git remote -v", ORIGIN)
            .ok("git rev-parse HEAD", "abc123\n")
            .ok("git branch -r --contains abc123", "  origin/main\n");
        let status = inspect(&runner, Path::new("/repo")).unwrap();

        assert!(status.synced_with_remote);
        assert!(!status.is_problem());
        assert_eq!(
            runner.command_lines(),
            vec![
                "git status",
                "git remote -v",
                "git rev-parse HEAD",
                "git branch -r --contains abc123",
            ]
        );
    }

    #[test]
    fn test_fallback_with_no_containing_branch() {
        let runner = ScriptedRunner::new()
            .ok("git status", CLEAN_UNTRACKED_BRANCH)
            .ok("git remote -v", ORIGIN)
            .ok("git rev-parse HEAD", "abc123\n")
            .ok("git branch -r --contains abc123", "\n");
        let status = inspect(&runner, Path::new("/repo")).unwrap();
        assert!(!status.synced_with_remote);
    }

    #[test]
    fn test_fallback_failure_is_not_fatal() {
        let runner = ScriptedRunner::new()
            .ok("git status", CLEAN_UNTRACKED_BRANCH)
            .ok("git remote -v", ORIGIN)
            .ok("git rev-parse HEAD", "abc123\n")
            .fail("git branch -r --contains abc123", 129, "error: malformed object name");
        let status = inspect(&runner, Path::new("/repo")).unwrap();
        assert!(!status.synced_with_remote);
        assert!(status.is_problem());
    }

    #[test]
    fn test_status_failure_is_fatal() {
        let runner = ScriptedRunner::new().fail("git status", 128, "fatal: not a git repository");
        let err = inspect(&runner, Path::new("/repo")).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: 128, .. }));
    }

    #[test]
    fn test_remote_listing_failure_is_fatal() {
        let runner = ScriptedRunner::new()
            .ok("git status", CLEAN_SYNCED)
            .fail("git remote -v", 1, "broken config");
        assert!(inspect(&runner, Path::new("/repo")).is_err());
    }

    #[test]
    fn test_parse_remotes_multiple() {
        let output = "origin\thttps://example.com/a.git (fetch)\n\
            origin\thttps://example.com/a.git (push)\n\
            backup\tssh://nas/a.git (fetch)\n\
            backup\tssh://nas/a.git (push)\n";
        let remotes = parse_remotes(output);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes["backup"], "ssh://nas/a.git");
    }

    #[test]
    fn test_parse_remotes_push_url_wins() {
        let output = "origin\thttps://fetch.example/a.git (fetch)\n\
            origin\tssh://push.example/a.git (push)\n";
        assert_eq!(parse_remotes(output)["origin"], "ssh://push.example/a.git");
    }

    #[test]
    fn test_parse_remotes_ignores_blank_and_partial_lines() {
        assert!(parse_remotes("").is_empty());
        assert!(parse_remotes("\n   \norphan\n").is_empty());
    }
}
