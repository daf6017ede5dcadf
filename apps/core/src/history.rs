//! Usage history that biases ranking toward results the user keeps picking.
//!
//! Every invocation of an action on a result with a history key adds a fixed
//! increment to that key's score. Once per process start the whole table
//! decays by `decay^days`, where `days` counts calendar days since the last
//! write, and entries that fall below `min_score` are dropped. The table is
//! persisted as `History.json` and rewritten after every change.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::HistorySettings;
use crate::logging;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub enum HistoryError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Json(error) => write!(f, "json error: {error}"),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<std::io::Error> for HistoryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// Scores count and every change is written to disk.
    Persistent,
    /// Scores count but nothing more is written this session.
    MemoryOnly,
    /// The history file could not be read; every factor is 1.
    Disabled,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HistoryFile {
    last_update: String,
    scores: BTreeMap<String, f64>,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    settings: HistorySettings,
    scores: BTreeMap<String, f64>,
    last_update: NaiveDateTime,
    state: HistoryState,
}

impl HistoryStore {
    pub fn initialize(path: &Path, settings: HistorySettings) -> Self {
        Self::initialize_at(path, settings, Local::now().naive_local())
    }

    pub fn initialize_at(path: &Path, settings: HistorySettings, now: NaiveDateTime) -> Self {
        let mut store = Self {
            path: Some(path.to_path_buf()),
            settings,
            scores: BTreeMap::new(),
            last_update: now,
            state: HistoryState::Persistent,
        };

        match read_history_file(path) {
            Ok(None) => {
                logging::info(&format!("creating history file {}", path.display()));
            }
            Ok(Some(file)) => {
                let days = elapsed_days(&file.last_update, now);
                let factor = settings.decay.powi(days);
                store.scores = file
                    .scores
                    .into_iter()
                    .map(|(key, score)| (key, score * factor))
                    .filter(|(_, score)| score.is_finite() && *score >= settings.min_score)
                    .collect();
                logging::info(&format!(
                    "history loaded entries={} days_elapsed={days}",
                    store.scores.len()
                ));
            }
            Err(error) => {
                logging::warn(&format!(
                    "history file {} unusable, continuing without history: {error}",
                    path.display()
                ));
                store.state = HistoryState::Disabled;
                return store;
            }
        }

        store.persist();
        store
    }

    pub fn in_memory(settings: HistorySettings) -> Self {
        Self {
            path: None,
            settings,
            scores: BTreeMap::new(),
            last_update: Local::now().naive_local(),
            state: HistoryState::MemoryOnly,
        }
    }

    pub fn disabled() -> Self {
        Self {
            state: HistoryState::Disabled,
            ..Self::in_memory(HistorySettings::default())
        }
    }

    pub fn record_use(&mut self, key: &str) {
        self.record_use_at(key, Local::now().naive_local());
    }

    pub fn record_use_at(&mut self, key: &str, now: NaiveDateTime) {
        if key.is_empty() || self.state == HistoryState::Disabled {
            return;
        }

        *self.scores.entry(key.to_string()).or_insert(0.0) += self.settings.increment;
        self.last_update = now;
        self.persist();
    }

    /// `1 + ln(score + 1) * weight`, or exactly `1.0` for unknown keys.
    pub fn history_factor(&self, key: &str) -> f64 {
        if key.is_empty() || self.state == HistoryState::Disabled {
            return 1.0;
        }
        match self.scores.get(key) {
            Some(score) => 1.0 + (score + 1.0).ln() * self.settings.history_score_weight,
            None => 1.0,
        }
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn state(&self) -> HistoryState {
        self.state
    }

    pub fn last_update(&self) -> NaiveDateTime {
        self.last_update
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&mut self) {
        if self.state != HistoryState::Persistent {
            return;
        }
        let Some(path) = self.path.as_deref() else {
            return;
        };

        let file = HistoryFile {
            last_update: self.last_update.format(TIMESTAMP_FORMAT).to_string(),
            scores: self.scores.clone(),
        };
        if let Err(error) = write_history_file(path, &file) {
            logging::warn(&format!(
                "history write to {} failed, keeping history in memory: {error}",
                path.display()
            ));
            self.state = HistoryState::MemoryOnly;
        }
    }
}

/// Whole calendar days between the stored timestamp and `now`. A missing or
/// unparseable timestamp, or one in the future, counts as zero days.
fn elapsed_days(last_update: &str, now: NaiveDateTime) -> i32 {
    let Ok(last) = NaiveDateTime::parse_from_str(last_update.trim(), TIMESTAMP_FORMAT) else {
        return 0;
    };
    let days = (now.date() - last.date()).num_days();
    days.clamp(0, i32::MAX as i64) as i32
}

fn read_history_file(path: &Path) -> Result<Option<HistoryFile>, HistoryError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

fn write_history_file(path: &Path, file: &HistoryFile) -> Result<(), HistoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let encoded = serde_json::to_string_pretty(file)?;
    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, encoded)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{elapsed_days, HistoryState, HistoryStore};
    use crate::config::HistorySettings;
    use chrono::NaiveDateTime;

    fn at(stamp: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn elapsed_days_uses_calendar_dates() {
        assert_eq!(elapsed_days("2024-03-01 23:59:00", at("2024-03-02 00:01:00")), 1);
        assert_eq!(elapsed_days("2024-03-01 00:00:01", at("2024-03-01 23:59:59")), 0);
        assert_eq!(elapsed_days("2024-03-05 10:00:00", at("2024-03-01 10:00:00")), 0);
        assert_eq!(elapsed_days("garbage", at("2024-03-01 10:00:00")), 0);
    }

    #[test]
    fn factor_is_one_for_unknown_and_empty_keys() {
        let mut store = HistoryStore::in_memory(HistorySettings::default());
        store.record_use("");
        assert!(store.is_empty());
        assert_eq!(store.history_factor(""), 1.0);
        assert_eq!(store.history_factor("never-used"), 1.0);
    }

    #[test]
    fn factor_grows_with_each_use() {
        let mut store = HistoryStore::in_memory(HistorySettings {
            history_score_weight: 1.0,
            ..Default::default()
        });
        store.record_use("apps:code");
        let once = store.history_factor("apps:code");
        store.record_use("apps:code");
        let twice = store.history_factor("apps:code");

        assert!(once > 1.0);
        assert!(twice > once);
        assert!((once - (1.0 + 2.0_f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn disabled_store_ignores_everything() {
        let mut store = HistoryStore::disabled();
        store.record_use("apps:code");
        assert_eq!(store.state(), HistoryState::Disabled);
        assert!(store.score("apps:code").is_none());
        assert_eq!(store.history_factor("apps:code"), 1.0);
    }
}
