//! Favourite symbols, persisted locally as a JSON list.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::DataError, model::Symbol};

/// Pinned symbols in the order they were pinned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinSet(IndexSet<Symbol>);

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `symbol`. Returns whether it is pinned afterwards.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        if self.0.shift_remove(symbol) {
            false
        } else {
            self.0.insert(Symbol::from(symbol));
            true
        }
    }

    /// Returns `true` if the symbol was not pinned before.
    pub fn pin(&mut self, symbol: &str) -> bool {
        self.0.insert(Symbol::from(symbol))
    }

    /// Returns `true` if the symbol was pinned before.
    pub fn unpin(&mut self, symbol: &str) -> bool {
        self.0.shift_remove(symbol)
    }

    pub fn is_pinned(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for PinSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Durable storage for a [`PinSet`].
pub trait PinStore {
    fn load(&self) -> Result<PinSet, DataError>;
    fn save(&self, pins: &PinSet) -> Result<(), DataError>;
}

/// Stores the pin set as a JSON list of symbols, e.g. `["AAPL","MSFT"]`.
#[derive(Debug, Clone)]
pub struct JsonFilePinStore {
    path: PathBuf,
}

impl JsonFilePinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PinStore for JsonFilePinStore {
    /// A missing or unreadable-as-JSON file yields an empty set; only I/O failures are errors.
    fn load(&self) -> Result<PinSet, DataError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(PinSet::new()),
            Err(error) => return Err(error.into()),
        };

        match serde_json::from_str::<PinSet>(&raw) {
            Ok(pins) => Ok(pins),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "corrupt pin file, starting empty");
                Ok(PinSet::new())
            }
        }
    }

    fn save(&self, pins: &PinSet) -> Result<(), DataError> {
        let json = serde_json::to_string(pins)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// A [`PinSet`] bound to its store: loaded once, written back after every mutation.
///
/// Write-back is best effort. A failed save is logged and the in-memory set stays authoritative.
#[derive(Debug)]
pub struct Pins<S> {
    set: PinSet,
    store: S,
}

impl<S: PinStore> Pins<S> {
    pub fn load(store: S) -> Self {
        let set = store.load().unwrap_or_else(|error| {
            warn!(%error, "failed to load pins, starting empty");
            PinSet::new()
        });
        debug!(count = set.len(), "pins loaded");
        Self { set, store }
    }

    pub fn set(&self) -> &PinSet {
        &self.set
    }

    pub fn is_pinned(&self, symbol: &str) -> bool {
        self.set.is_pinned(symbol)
    }

    pub fn toggle(&mut self, symbol: &str) -> bool {
        let pinned = self.set.toggle(symbol);
        self.persist();
        pinned
    }

    pub fn pin(&mut self, symbol: &str) -> bool {
        let changed = self.set.pin(symbol);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn unpin(&mut self, symbol: &str) -> bool {
        let changed = self.set.unpin(symbol);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&self) {
        if let Err(error) = self.store.save(&self.set) {
            warn!(%error, "failed to persist pins");
        }
    }
}
