use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use shared::models::{PrinterConfig, RestaurantSettings};
use shared::{AppError, ErrorCode};
use thiserror::Error;
use tracing::{info, instrument, warn};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::with_message(ErrorCode::StorageFailed, err.to_string())
    }
}

/// Persisted settings with snapshot reads
///
/// Cloning is cheap, all clones share the same snapshot.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    current: RwLock<Arc<RestaurantSettings>>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Open the store in `work_dir`, starting empty when no file exists
    #[instrument]
    pub fn open(work_dir: &Path) -> Result<Self, SettingsError> {
        std::fs::create_dir_all(work_dir).map_err(|source| SettingsError::Io {
            path: work_dir.to_path_buf(),
            source,
        })?;

        let path = work_dir.join(SETTINGS_FILE);
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            warn!(path = %path.display(), "No settings file yet, starting empty");
            RestaurantSettings::default()
        };

        info!(
            stations = settings.stations.len(),
            printers = settings.printers.len(),
            "Settings loaded"
        );

        Ok(Self::with_path(path, settings))
    }

    /// In-memory store writing to `path` on change
    pub fn with_path(path: PathBuf, settings: RestaurantSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                current: RwLock::new(Arc::new(settings)),
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Current settings, immutable for as long as the caller holds it
    pub fn snapshot(&self) -> Arc<RestaurantSettings> {
        self.inner.current.read().clone()
    }

    /// Replace the whole document
    pub fn replace(&self, settings: RestaurantSettings) -> Result<Arc<RestaurantSettings>, SettingsError> {
        self.update(|current| *current = settings)
    }

    /// Apply `f` to a copy of the current settings, persist, then publish
    ///
    /// Nothing is published when persisting fails.
    pub fn update<F>(&self, f: F) -> Result<Arc<RestaurantSettings>, SettingsError>
    where
        F: FnOnce(&mut RestaurantSettings),
    {
        let _guard = self.inner.write_lock.lock();

        let mut next = (*self.snapshot()).clone();
        f(&mut next);
        self.persist(&next)?;

        let next = Arc::new(next);
        *self.inner.current.write() = next.clone();
        Ok(next)
    }

    /// Insert or replace the printer of `config.station_id`
    pub fn upsert_printer(&self, config: PrinterConfig) -> Result<Arc<RestaurantSettings>, SettingsError> {
        self.update(|s| {
            s.printers.insert(config.station_id.clone(), config);
        })
    }

    /// Remove a station's printer, returning it when one was configured
    pub fn remove_printer(&self, station_id: &str) -> Result<Option<PrinterConfig>, SettingsError> {
        if self.snapshot().printer(station_id).is_none() {
            return Ok(None);
        }
        let mut removed = None;
        self.update(|s| removed = s.printers.remove(station_id))?;
        Ok(removed)
    }

    /// Write to a sibling temp file then rename over the document
    fn persist(&self, settings: &RestaurantSettings) -> Result<(), SettingsError> {
        let path = &self.inner.path;
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = path.with_extension("json.tmp");

        std::fs::write(&tmp, json).map_err(|source| SettingsError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })
    }
}
