//! # Managed Exclude Section
//!
//! repo-manager owns one region of a repo's `.git/info/exclude`, delimited
//! by two marker lines:
//!
//! ```text
//! # <repo-manager>
//! target/
//! .envrc
//! # </repo-manager>
//! ```
//!
//! Everything between the markers is rewritten wholesale on each run;
//! everything outside them is left exactly as it was. The file is only
//! written when its content actually changes, so a no-op run does not touch
//! its modification time.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use regex::Regex;

use crate::error::Result;

pub const SECTION_START: &str = "# <repo-manager>";
pub const SECTION_END: &str = "# </repo-manager>";

/// Replace the managed section of `original` with `entries`.
///
/// - Existing sections are removed; a non-empty entry list is written back
///   where the first section was.
/// - A section added to a file that has none is separated from the existing
///   text by a blank line and followed by a newline.
/// - The result always ends with a newline.
pub fn patch_marked_section(original: &str, entries: &[String]) -> Result<String> {
    let section = Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(SECTION_START),
        regex::escape(SECTION_END)
    ))?;
    let mut outside: Vec<&str> = section.split(original).collect();

    let mut block: Vec<&str> = Vec::new();
    if !entries.is_empty() {
        let fresh = outside.len() == 1;
        if fresh && !outside[0].is_empty() {
            if !outside[0].ends_with("\n\n") {
                block.push("");
            }
            if !outside[0].ends_with('\n') {
                block.push("");
            }
        }
        block.push(SECTION_START);
        block.extend(entries.iter().map(String::as_str));
        block.push(SECTION_END);
        if fresh {
            block.push("");
        }
    }

    let joined = block.join("\n");
    if !joined.is_empty() {
        outside.insert(1, &joined);
    }
    let mut result = outside.concat();
    if !result.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

/// Path of the exclude file of the working copy at `repo_dir`.
pub fn exclude_file(repo_dir: &Path) -> PathBuf {
    repo_dir.join(".git").join("info").join("exclude")
}

/// Bring the managed section of `repo_dir`'s exclude file in line with
/// `entries`. Returns whether the file was written.
pub fn update_exclude_file(repo_dir: &Path, entries: &[String]) -> Result<bool> {
    let path = exclude_file(repo_dir);
    let original = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if entries.is_empty() {
                return Ok(false);
            }
            String::new()
        }
        Err(e) => return Err(e.into()),
    };

    let patched = patch_marked_section(&original, entries)?;
    if patched == original {
        debug!("Exclude file unchanged");
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, patched)?;
    info!("Exclude file {} updated", path.display());
    Ok(true)
}
