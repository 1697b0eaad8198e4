//! # Path Classification
//!
//! Decides which kind of object a filesystem path is, using structural probes
//! tried in a fixed priority order:
//!
//! 1. **Symlink** - intercepted first so links are never followed into
//!    directories (this is what keeps cyclic trees finite).
//! 2. **Git repo** - a real directory holding a `.git` directory.
//! 3. **Mercurial repo** - a real directory holding a `.hg` directory.
//! 4. **Directory**
//! 5. **Plain file**
//!
//! The first kind whose precondition holds wins. A link that resolves to
//! itself is not accepted as a symlink, and since every later kind requires
//! a non-link path, such a path ends up unclassifiable.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// The structural kind of a path, before any inspection of its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    Symlink { target: PathBuf },
    GitRepo,
    MercurialRepo,
    Directory,
    PlainFile,
}

/// Classify `path`.
///
/// Fails with [`Error::Unclassifiable`] when no kind matches, e.g. for a
/// socket, a vanished path, or a self-referential link.
pub fn classify(path: &Path) -> Result<PathKind> {
    let is_link = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);

    if is_link {
        let source = normalize_lexically(&std::path::absolute(path)?);
        let target = resolve_link(&source);
        if target != source {
            return Ok(PathKind::Symlink { target });
        }
    }

    let kind = if is_link {
        None
    } else if path.join(".git").is_dir() {
        Some(PathKind::GitRepo)
    } else if path.join(".hg").is_dir() {
        Some(PathKind::MercurialRepo)
    } else if path.is_dir() {
        Some(PathKind::Directory)
    } else if path.is_file() {
        Some(PathKind::PlainFile)
    } else {
        None
    };

    kind.ok_or_else(|| Error::Unclassifiable {
        path: path.to_path_buf(),
    })
}

/// Fully resolve a link. Dangling or looping links cannot be canonicalized;
/// for those the chain is followed as far as possible and the remainder is
/// normalized lexically.
fn resolve_link(link: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(link) {
        return resolved;
    }
    match fs::read_link(link) {
        Ok(target) => {
            let base = link.parent().unwrap_or_else(|| Path::new("/"));
            normalize_lexically(&base.join(target))
        }
        Err(_) => link.to_path_buf(),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
