//! On-disk form of a listing snapshot.
//!
//! ```json
//! {
//!   "stock_data": { "600000": { "code": "600000", "name": "浦发银行", ... } },
//!   "last_update": 1718000000.0
//! }
//! ```
//!
//! Entry order in `stock_data` is the index order. `last_update` keeps
//! microsecond precision.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::ResolverError;
use crate::models::{Identifier, InstrumentRecord, ListingSnapshot};

#[derive(Deserialize)]
struct CacheFile {
    stock_data: IndexMap<Identifier, InstrumentRecord>,
    last_update: f64,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    stock_data: &'a IndexMap<Identifier, InstrumentRecord>,
    last_update: f64,
}

/// JSON file holding the last published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted snapshot.
    ///
    /// Returns `Ok(None)` when no file exists and `CacheCorrupt` when the
    /// file cannot be parsed or its records are inconsistent.
    pub fn load(&self) -> Result<Option<ListingSnapshot>, ResolverError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No listing cache at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let file: CacheFile =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        let built_at = epoch_to_datetime(file.last_update)
            .ok_or_else(|| self.corrupt(format!("invalid last_update {}", file.last_update)))?;

        let mut records = file.stock_data;
        for (key, record) in records.iter_mut() {
            if key != &record.identifier {
                return Err(self.corrupt(format!(
                    "entry '{}' holds record '{}'",
                    key, record.identifier
                )));
            }
            if record.identifier.trim().is_empty() || record.display_name.trim().is_empty() {
                return Err(self.corrupt(format!("entry '{}' has an empty field", key)));
            }
            if record.canonical_name.is_empty() {
                record.canonical_name = record.display_name.clone();
            }
        }

        info!(
            "Loaded {} listings from {} (built {})",
            records.len(),
            self.path.display(),
            built_at
        );
        Ok(Some(ListingSnapshot::from_parts(records, built_at)))
    }

    /// Writes `snapshot`, replacing any previous file.
    ///
    /// The content goes to a sibling temp file first and is renamed over
    /// the target, so readers never see a partial file.
    pub fn save(&self, snapshot: &ListingSnapshot) -> Result<(), ResolverError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = CacheFileRef {
            stock_data: snapshot.records_map(),
            last_update: snapshot.built_at().timestamp_micros() as f64 / 1_000_000.0,
        };
        let content = serde_json::to_string_pretty(&file)?;

        let tmp_path = self.temp_path()?;
        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(
            "Saved {} listings to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, ResolverError> {
        let mut name = self
            .path
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("cache path {} has no file name", self.path.display()),
                )
            })?
            .to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }

    fn corrupt(&self, message: String) -> ResolverError {
        ResolverError::CacheCorrupt {
            path: self.path.display().to_string(),
            message,
        }
    }
}

fn epoch_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    Utc.timestamp_opt(micros.div_euclid(1_000_000), nanos)
        .single()
}
