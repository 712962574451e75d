//! Durable per-user flags.
//!
//! The engine persists two booleans: whether effects are muted and whether
//! the firework mode was left on. Reads and writes can fail (read-only home,
//! corrupt file); callers log the failure and treat the flag as `false`.

use crate::error::PrefsError;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key/value store for boolean preferences.
pub trait PreferenceStore {
    /// Stored value, or `None` if the key was never written.
    fn load_flag(&self, key: &str) -> Result<Option<bool>, PrefsError>;

    /// Persist `value` under `key`.
    fn store_flag(&mut self, key: &str, value: bool) -> Result<(), PrefsError>;
}

/// Read a flag, treating both absence and failure as `false`.
pub fn load_or_default(store: &dyn PreferenceStore, key: &str) -> bool {
    match store.load_flag(key) {
        Ok(value) => value.unwrap_or(false),
        Err(err) => {
            log::warn!("could not read preference {key}: {err}");
            false
        }
    }
}

/// Write a flag, logging failure.
pub fn store_or_warn(store: &mut dyn PreferenceStore, key: &str, value: bool) {
    if let Err(err) = store.store_flag(key, value) {
        log::warn!("could not save preference {key}: {err}");
    }
}

/// Preferences kept in a TOML file of `key = bool` lines.
///
/// Every store re-reads the file so that two processes sharing it do not
/// clobber each other's keys.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, bool>, PrefsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PrefsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(toml::from_str(&text)?)
    }
}

impl PreferenceStore for FilePreferences {
    fn load_flag(&self, key: &str) -> Result<Option<bool>, PrefsError> {
        Ok(self.read_table()?.get(key).copied())
    }

    fn store_flag(&mut self, key: &str, value: bool) -> Result<(), PrefsError> {
        let mut table = self.read_table()?;
        table.insert(key.to_owned(), value);
        let text = toml::to_string(&table)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, text).map_err(|source| PrefsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    flags: HashMap<String, bool>,
    failing: bool,
}

/// In-memory preferences. Clones share the same map, so a "restarted"
/// component can be handed a clone and see what the old one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent load and store fail, as when storage is disabled.
    pub fn set_failing(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }

    fn unavailable() -> PrefsError {
        PrefsError::Io {
            path: PathBuf::from("<memory>"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "storage disabled"),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load_flag(&self, key: &str) -> Result<Option<bool>, PrefsError> {
        let inner = self.inner.borrow();
        if inner.failing {
            return Err(Self::unavailable());
        }
        Ok(inner.flags.get(key).copied())
    }

    fn store_flag(&mut self, key: &str, value: bool) -> Result<(), PrefsError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing {
            return Err(Self::unavailable());
        }
        inner.flags.insert(key.to_owned(), value);
        Ok(())
    }
}
