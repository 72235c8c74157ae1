use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::data_dir;

/// Key the high score is stored under.
pub const HIGH_SCORE_KEY: &str = "jungle-snake.high_score";

const SCORE_FILE_NAME: &str = "scores.json";

/// Persistent high-score storage.
///
/// Reads never fail: a missing or corrupt value reads as zero. Writes are
/// best-effort.
pub trait ScorePersistence {
    fn high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32);
}

/// Keeps the high score in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    high_score: u32,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn with_high_score(high_score: u32) -> Self {
        Self { high_score }
    }
}

impl ScorePersistence for MemoryScoreStore {
    fn high_score(&self) -> u32 {
        self.high_score
    }

    fn set_high_score(&mut self, score: u32) {
        self.high_score = score;
    }
}

/// High score kept in a JSON key/value file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    /// Store at the platform-correct score file path.
    #[must_use]
    pub fn open_default() -> Self {
        Self::at(scores_path())
    }

    #[must_use]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScorePersistence for JsonScoreStore {
    fn high_score(&self) -> u32 {
        match load_high_score_from_path(&self.path) {
            Ok(score) => score,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "unreadable score file; using 0");
                0
            }
        }
    }

    fn set_high_score(&mut self, score: u32) {
        if let Err(error) = save_high_score_to_path(&self.path, score) {
            warn!(path = %self.path.display(), %error, "failed to save high score");
        }
    }
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    data_dir().join(SCORE_FILE_NAME)
}

fn read_entries(path: &Path) -> io::Result<BTreeMap<String, serde_json::Value>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e),
    };

    serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn load_high_score_from_path(path: &Path) -> io::Result<u32> {
    let entries = read_entries(path)?;
    let Some(value) = entries.get(HIGH_SCORE_KEY) else {
        return Ok(0);
    };

    value
        .as_u64()
        .and_then(|score| u32::try_from(score).ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{HIGH_SCORE_KEY} is not a score: {value}"),
            )
        })
}

fn save_high_score_to_path(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Unrelated keys survive; a corrupt file is replaced.
    let mut entries = read_entries(path).unwrap_or_default();
    entries.insert(HIGH_SCORE_KEY.to_owned(), serde_json::Value::from(score));

    let json = serde_json::to_string_pretty(&entries)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{
        JsonScoreStore, ScorePersistence, load_high_score_from_path, save_high_score_to_path,
    };

    #[test]
    fn score_survives_a_new_store_instance() {
        let path = unique_test_path("persist");

        JsonScoreStore::at(path.clone()).set_high_score(42);
        let reopened = JsonScoreStore::at(path.clone());

        assert_eq!(reopened.high_score(), 42);
        cleanup_test_path(&path);
    }

    #[test]
    fn missing_score_file_returns_zero() {
        let path = unique_test_path("missing");
        let loaded = load_high_score_from_path(&path).expect("missing file should return Ok(0)");
        assert_eq!(loaded, 0);
    }

    #[test]
    fn malformed_score_file_reads_as_zero() {
        let path = unique_test_path("malformed");
        write_file(&path, "not-json");

        assert!(load_high_score_from_path(&path).is_err());
        assert_eq!(JsonScoreStore::at(path.clone()).high_score(), 0);

        cleanup_test_path(&path);
    }

    #[test]
    fn non_numeric_value_reads_as_zero() {
        let path = unique_test_path("string-value");
        write_file(&path, r#"{ "jungle-snake.high_score": "lots" }"#);

        assert_eq!(JsonScoreStore::at(path.clone()).high_score(), 0);

        cleanup_test_path(&path);
    }

    #[test]
    fn saving_keeps_unrelated_keys() {
        let path = unique_test_path("other-keys");
        write_file(&path, r#"{ "jungle-snake.skin": "default" }"#);

        save_high_score_to_path(&path, 70).expect("score save should succeed");
        let raw = fs::read_to_string(&path).expect("score file should exist");

        assert!(raw.contains("jungle-snake.skin"));
        assert_eq!(load_high_score_from_path(&path).expect("load should succeed"), 70);
        cleanup_test_path(&path);
    }

    fn write_file(path: &PathBuf, raw: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, raw).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("jungle-snake-score-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
