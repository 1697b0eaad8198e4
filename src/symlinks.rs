//! Symlink farm maintenance for provisioned repos

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::classify::normalize_lexically;
use crate::error::{Error, Result};

/// What [`ensure_symlink`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Unchanged,
    Created,
    Replaced,
}

/// Make `link` a symlink to `target` (made absolute).
///
/// An existing link to the same place is left alone and a link elsewhere is
/// replaced. Anything else already at `link` is an error.
pub fn ensure_symlink(target: &Path, link: &Path) -> Result<LinkOutcome> {
    let target = normalize_lexically(&std::path::absolute(target)?);

    let outcome = match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = fs::read_link(link)?;
            if resolve_against(link, &current) == target {
                debug!("Leaving {} unchanged", link.display());
                return Ok(LinkOutcome::Unchanged);
            }
            info!(
                "Removing old link from {} to {}",
                link.display(),
                current.display()
            );
            remove_symlink(link)?;
            LinkOutcome::Replaced
        }
        Ok(_) => {
            return Err(Error::precondition(format!(
                "{} already exists and is not a symlink",
                link.display()
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => LinkOutcome::Created,
        Err(e) => return Err(e.into()),
    };

    info!("Linking {} to {}", link.display(), target.display());
    make_symlink(&target, link)?;
    Ok(outcome)
}

/// Link every non-hidden entry of `source_dir` into `link_dir`, except the
/// names in `skip`. Returns the links that were created or replaced.
pub fn link_all(
    source_dir: &Path,
    link_dir: &Path,
    skip: &[&str],
) -> Result<Vec<(PathBuf, LinkOutcome)>> {
    let mut changed = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if name_str.starts_with('.') || skip.iter().any(|s| *s == name_str) {
            continue;
        }
        let link = link_dir.join(name);
        let outcome = ensure_symlink(entry.path(), &link)?;
        if outcome != LinkOutcome::Unchanged {
            changed.push((link, outcome));
        }
    }
    Ok(changed)
}

/// Remove every symlink directly inside `dir` whose target does not exist.
/// Returns the removed links.
pub fn remove_dangling_symlinks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.path_is_symlink() {
            continue;
        }
        let path = entry.path();
        // `exists` follows the link
        if !path.exists() {
            info!(
                "Removing broken symlink {} (was pointing to {})",
                path.display(),
                fs::read_link(path)?.display()
            );
            remove_symlink(path)?;
            removed.push(path.to_path_buf());
        }
    }
    Ok(removed)
}

/// Where a link's stored target points, as an absolute normalized path.
fn resolve_against(link: &Path, stored: &Path) -> PathBuf {
    let base = link.parent().unwrap_or_else(|| Path::new("/"));
    let joined = base.join(stored);
    normalize_lexically(&std::path::absolute(&joined).unwrap_or(joined))
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    // Directory links on Windows are removed like directories
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Farm {
        _temp: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    fn farm() -> Farm {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("config/dotfiles");
        let target = temp.path().join("home/dotfiles");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        Farm {
            _temp: temp,
            source,
            target,
        }
    }

    #[test]
    fn test_creates_links_for_visible_entries() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();
        fs::create_dir(f.source.join("scripts")).unwrap();
        fs::write(f.source.join(".secret"), "s").unwrap();
        fs::write(f.source.join("repo.json"), "{}").unwrap();

        let changed = link_all(&f.source, &f.target, &["repo.json"]).unwrap();
        assert_eq!(changed.len(), 2);
        assert!(changed.iter().all(|(_, o)| *o == LinkOutcome::Created));

        assert_eq!(
            fs::read_link(f.target.join("notes.md")).unwrap(),
            f.source.join("notes.md")
        );
        assert!(f.target.join("scripts").is_dir());
        assert!(fs::symlink_metadata(f.target.join(".secret")).is_err());
        assert!(fs::symlink_metadata(f.target.join("repo.json")).is_err());
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();

        link_all(&f.source, &f.target, &[]).unwrap();
        assert!(link_all(&f.source, &f.target, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_relative_link_to_same_target_is_kept() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();
        symlink("../../config/dotfiles/notes.md", f.target.join("notes.md")).unwrap();

        let outcome = ensure_symlink(&f.source.join("notes.md"), &f.target.join("notes.md")).unwrap();
        assert_eq!(outcome, LinkOutcome::Unchanged);
        assert_eq!(
            fs::read_link(f.target.join("notes.md")).unwrap(),
            PathBuf::from("../../config/dotfiles/notes.md")
        );
    }

    #[test]
    fn test_mismatched_link_is_replaced() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();
        symlink("/somewhere/else", f.target.join("notes.md")).unwrap();

        let outcome = ensure_symlink(&f.source.join("notes.md"), &f.target.join("notes.md")).unwrap();
        assert_eq!(outcome, LinkOutcome::Replaced);
        assert_eq!(
            fs::read_link(f.target.join("notes.md")).unwrap(),
            f.source.join("notes.md")
        );
    }

    #[test]
    fn test_dangling_link_in_the_way_is_replaced() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();
        symlink(f.source.join("gone"), f.target.join("notes.md")).unwrap();

        let outcome = ensure_symlink(&f.source.join("notes.md"), &f.target.join("notes.md")).unwrap();
        assert_eq!(outcome, LinkOutcome::Replaced);
    }

    #[test]
    fn test_real_file_in_the_way_is_an_error() {
        let f = farm();
        fs::write(f.source.join("notes.md"), "n").unwrap();
        fs::write(f.target.join("notes.md"), "local").unwrap();

        let err = ensure_symlink(&f.source.join("notes.md"), &f.target.join("notes.md")).unwrap_err();
        assert!(err.to_string().contains("already exists and is not a symlink"));
        assert_eq!(fs::read_to_string(f.target.join("notes.md")).unwrap(), "local");
    }

    #[test]
    fn test_remove_dangling_symlinks() {
        let f = farm();
        fs::write(f.source.join("alive"), "").unwrap();
        symlink(f.source.join("alive"), f.target.join("alive")).unwrap();
        symlink(f.source.join("dead"), f.target.join("dead")).unwrap();
        symlink(f.source.join("hidden-dead"), f.target.join(".hidden")).unwrap();
        fs::write(f.target.join("regular"), "").unwrap();

        let mut removed = remove_dangling_symlinks(&f.target).unwrap();
        removed.sort();
        assert_eq!(removed, vec![f.target.join(".hidden"), f.target.join("dead")]);
        assert!(f.target.join("alive").exists());
        assert!(f.target.join("regular").exists());
        assert!(remove_dangling_symlinks(&f.target).unwrap().is_empty());
    }
}
