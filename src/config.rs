//! # Repository Descriptors
//!
//! `setup` works from named repository descriptors stored as JSON. Two file
//! shapes are recognized:
//!
//! - **`repo.json`**: a single descriptor. Its `name` defaults to the name of
//!   the directory holding it, and that directory doubles as the source of
//!   the repo's symlink farm.
//! - **`repo_list.json`**: an array of descriptors, each with an explicit
//!   `name` and no symlink source.
//!
//! ```json
//! {
//!     "//": "free-form comment, ignored",
//!     "remotes": { "origin": "git@example.com:me/dotfiles.git" },
//!     "exclude": ["target/", ".envrc"]
//! }
//! ```
//!
//! [`ConfigDb::load_path`] walks a config tree and collects every descriptor it
//! finds. A descriptor that fails to parse or validate is skipped with a
//! warning so one bad file does not take the others down with it. Two
//! descriptors with the same name are a hard error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub const REPO_JSON: &str = "repo.json";
pub const REPO_LIST_JSON: &str = "repo_list.json";

/// One validated repository descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub name: String,
    /// Remote name to URL. Never empty.
    pub remotes: BTreeMap<String, String>,
    /// Lines for the managed section of the exclude file, in order.
    pub exclude: Vec<String>,
    pub symlink_source_dir: Option<PathBuf>,
}

/// Descriptor as it appears on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRepoConfig {
    #[serde(default)]
    name: Option<String>,
    remotes: BTreeMap<String, String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(rename = "//", default)]
    _comment: Option<serde_json::Value>,
}

impl RepoConfig {
    /// Build a descriptor from parsed JSON.
    ///
    /// `source_dir` is the directory of a `repo.json`; it supplies the default
    /// name and the symlink source. List entries pass `None`.
    pub fn from_json(value: serde_json::Value, source_dir: Option<&Path>) -> Result<Self> {
        let raw: RawRepoConfig = serde_json::from_value(value)?;

        let name = match (raw.name, source_dir) {
            (Some(name), _) => name,
            (None, Some(dir)) => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            (None, None) => return Err(Error::config("name is required")),
        };
        if name.is_empty() {
            return Err(Error::config("name must not be empty"));
        }
        if raw.remotes.is_empty() {
            return Err(Error::config(format!("{name}: remotes must not be empty")));
        }

        Ok(Self {
            name,
            remotes: raw.remotes,
            exclude: raw.exclude,
            symlink_source_dir: source_dir.map(Path::to_path_buf),
        })
    }

    /// The remote to clone from: `origin`, or the only remote there is.
    pub fn clone_source(&self) -> Result<(&str, &str)> {
        if let Some(url) = self.remotes.get("origin") {
            return Ok(("origin", url.as_str()));
        }
        match self.remotes.iter().next() {
            Some((name, url)) if self.remotes.len() == 1 => Ok((name.as_str(), url.as_str())),
            _ => Err(Error::precondition(format!(
                "{} has several remotes and none is named origin, not sure which one to clone",
                self.name
            ))),
        }
    }
}

/// Every descriptor loaded for this run, keyed by name.
#[derive(Debug, Default)]
pub struct ConfigDb {
    repos: BTreeMap<String, RepoConfig>,
}

impl ConfigDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repo(&mut self, config: RepoConfig) -> Result<()> {
        if self.repos.contains_key(&config.name) {
            return Err(Error::DuplicateRepo { name: config.name });
        }
        debug!("Loaded {} repo", config.name);
        self.repos.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RepoConfig> {
        self.repos.get(name)
    }

    /// Like [`get`](Self::get) but an unknown name is an error.
    pub fn lookup(&self, name: &str) -> Result<&RepoConfig> {
        self.get(name).ok_or_else(|| Error::UnknownRepo {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Load descriptors from `path`, which may be a descriptor file or a
    /// config directory.
    ///
    /// A directory holding a `repo.json` is a single descriptor and is not
    /// searched further. Any other directory contributes its `repo_list.json`
    /// (if any) and everything found in its non-hidden subdirectories.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        debug!("Loading config from {}", path.display());
        let basename = path.file_name().map(|n| n.to_string_lossy());
        match basename.as_deref() {
            Some(REPO_JSON) => return self.load_repo_json(path),
            Some(REPO_LIST_JSON) => return self.load_repo_list_json(path),
            _ => {}
        }

        let repo_json = path.join(REPO_JSON);
        if repo_json.exists() {
            return self.load_repo_json(&repo_json);
        }

        let repo_list_json = path.join(REPO_LIST_JSON);
        if repo_list_json.exists() {
            self.load_repo_list_json(&repo_list_json)?;
        }

        if !path.is_dir() {
            warn!("{} is not a directory", path.display());
            return Ok(());
        }
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.path().is_dir() {
                self.load_path(entry.path())?;
            }
        }
        Ok(())
    }

    /// Load a single-descriptor file. Invalid content is skipped with a warning.
    pub fn load_repo_json(&mut self, path: &Path) -> Result<()> {
        debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<serde_json::Value>(&text)
            .map_err(Error::from)
            .and_then(|value| RepoConfig::from_json(value, path.parent()));
        match parsed {
            Ok(config) => self.add_repo(config),
            Err(e) => {
                warn!("failed to load {}: {}", path.display(), e);
                Ok(())
            }
        }
    }

    /// Load a descriptor list. Invalid entries are skipped one by one.
    pub fn load_repo_list_json(&mut self, path: &Path) -> Result<()> {
        debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(path)?;
        let entries = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("failed to load {}: repo list must be an array", path.display());
                return Ok(());
            }
            Err(e) => {
                warn!("failed to load {}: {}", path.display(), e);
                return Ok(());
            }
        };

        for (i, entry) in entries.into_iter().enumerate() {
            match RepoConfig::from_json(entry, None) {
                Ok(config) => self.add_repo(config)?,
                Err(e) => warn!("failed to load repo {} from {}: {}", i, path.display(), e),
            }
        }
        Ok(())
    }
}
