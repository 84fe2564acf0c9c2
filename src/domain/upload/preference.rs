// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/upload/preference.rs
//
// Persisted choice of the last submitted filter.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constant::{CONFIG_DIR, PREFERENCE_EPOCH_DAY, PREFERENCE_EPOCH_MONTH, PREFERENCE_FILE};
use crate::domain::image::Filter;
use crate::error::ResizerResult;

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    filter: Filter,
    expires: NaiveDate,
}

/// File-backed store for the preferred filter.
///
/// An entry lives for as many days as have passed since the most recent
/// 9 December, counted on the day it is written.
#[derive(Debug, Clone)]
pub struct FilterPreference {
    path: PathBuf,
}

impl FilterPreference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user config directory.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join(CONFIG_DIR).join(PREFERENCE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored filter, unless missing, unreadable or expired by `today`.
    pub fn load(&self, today: NaiveDate) -> Option<Filter> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                return None;
            }
        };

        let stored: StoredPreference = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Ignoring malformed {}: {e}", self.path.display());
                return None;
            }
        };

        if today < stored.expires {
            Some(stored.filter)
        } else {
            log::debug!("filter preference expired on {}", stored.expires);
            None
        }
    }

    pub fn save(&self, filter: Filter, today: NaiveDate) -> ResizerResult<()> {
        let days = days_to_expire(today);
        let expires = today.checked_add_days(Days::new(days)).unwrap_or(today);
        let stored = StoredPreference { filter, expires };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        log::debug!("saved filter {filter} until {expires}");
        Ok(())
    }
}

/// Days elapsed since the most recent 9 December, `today` included as day 0.
pub fn days_to_expire(today: NaiveDate) -> u64 {
    let epoch = |year| NaiveDate::from_ymd_opt(year, PREFERENCE_EPOCH_MONTH, PREFERENCE_EPOCH_DAY);

    let last = match epoch(today.year()) {
        Some(date) if date <= today => Some(date),
        _ => epoch(today.year() - 1),
    };

    last.map(|date| (today - date).num_days().max(0) as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn lifetime_counts_from_last_ninth_of_december() {
        assert_eq!(days_to_expire(date(2026, 12, 9)), 0);
        assert_eq!(days_to_expire(date(2026, 12, 19)), 10);
        assert_eq!(days_to_expire(date(2027, 1, 1)), 23);
        assert_eq!(days_to_expire(date(2026, 12, 8)), 364);
    }

    #[test]
    fn saved_filter_is_read_back_until_expiry() {
        let dir = tempdir().unwrap();
        let store = FilterPreference::new(dir.path().join("nested").join("filter.json"));
        let today = date(2026, 12, 19);

        store.save(Filter::Sepia, today).unwrap();
        assert_eq!(store.load(today), Some(Filter::Sepia));
        assert_eq!(store.load(date(2026, 12, 28)), Some(Filter::Sepia));
        assert_eq!(store.load(date(2026, 12, 29)), None);
    }

    #[test]
    fn saving_on_the_epoch_expires_immediately() {
        let dir = tempdir().unwrap();
        let store = FilterPreference::new(dir.path().join("filter.json"));
        store.save(Filter::Marvin, date(2026, 12, 9)).unwrap();
        assert_eq!(store.load(date(2026, 12, 9)), None);
    }

    #[test]
    fn missing_or_broken_files_read_as_absent() {
        let dir = tempdir().unwrap();
        let store = FilterPreference::new(dir.path().join("filter.json"));
        assert_eq!(store.load(date(2026, 1, 1)), None);

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(date(2026, 1, 1)), None);
    }
}
