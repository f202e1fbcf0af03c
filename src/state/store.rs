//! Cursor persistence
//!
//! The cursor lives inside the settings document. Every save rewrites the whole
//! document and only returns once the new contents are on disk, so a restart
//! resumes from the last page that was fetched.

use crate::config::{load_settings, Settings};
use crate::state::Cursor;
use crate::{ConfigError, StateError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Trait for cursor persistence backends
pub trait StateStore {
    /// Returns the cursor the crawl should resume from
    fn load(&self) -> Cursor;

    /// Durably records `cursor`; must not return before the write is flushed
    fn save(&mut self, cursor: &Cursor) -> Result<(), StateError>;
}

/// State store backed by the TOML settings document
#[derive(Debug)]
pub struct TomlStateStore {
    path: PathBuf,
    settings: Settings,
}

impl TomlStateStore {
    /// Opens the settings document at `path`
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let settings = load_settings(path)?;
        Ok(Self::new(path, settings))
    }

    /// Wraps settings that were already loaded from `path`
    pub fn new(path: &Path, settings: Settings) -> Self {
        Self {
            path: path.to_path_buf(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Points the cursor back at the first page of the configured hashtag
    pub fn reset(&mut self) -> Result<(), StateError> {
        let cursor = Cursor::start(self.settings.crawl.hashtag.clone());
        self.save(&cursor)
    }
}

impl StateStore for TomlStateStore {
    fn load(&self) -> Cursor {
        self.settings
            .cursor
            .clone()
            .for_tag(&self.settings.crawl.hashtag)
    }

    fn save(&mut self, cursor: &Cursor) -> Result<(), StateError> {
        self.settings.cursor = cursor.clone();
        write_document(&self.path, &self.settings)
    }
}

/// Serializes the full settings document and atomically replaces `path`
fn write_document(path: &Path, settings: &Settings) -> Result<(), StateError> {
    let content = toml::to_string_pretty(settings)?;
    let tmp_path = path.with_extension("toml.tmp");

    let write_err = |source: std::io::Error| StateError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::create(&tmp_path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(write_err)?;
    sync_parent_dir(path).map_err(write_err)?;

    tracing::trace!("Saved cursor {} to {}", settings.cursor, path.display());
    Ok(())
}

/// Flushes the directory entry written by the rename
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
