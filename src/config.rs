use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::grid::GridSize;

const APP_DIR_NAME: &str = "jungle-snake";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Default play-field width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 40;

/// Default play-field height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 24;

/// Smallest field that still fits the start snake and its safe zone.
pub const MIN_GRID_WIDTH: u16 = 20;
pub const MIN_GRID_HEIGHT: u16 = 14;

pub const MAX_GRID_WIDTH: u16 = 200;
pub const MAX_GRID_HEIGHT: u16 = 100;

/// Terminal columns drawn per grid cell.
pub const CELL_WIDTH: u16 = 2;

/// Fixed logic tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 120;

/// Lower bound accepted from the settings file.
pub const MIN_TICK_INTERVAL_MS: u64 = 20;

/// Upper bound on logic ticks executed for a single host frame.
pub const MAX_TICKS_PER_FRAME: u32 = 4;

/// Wall-clock length of the hit animation in milliseconds.
pub const DEFAULT_HIT_ANIMATION_MS: u64 = 1000;

/// Score granted for each food eaten.
pub const FOOD_REWARD: u32 = 10;

/// Rejection-sampling attempts before food placement gives up.
pub const FOOD_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Rejection-sampling attempts per obstacle before it is skipped.
pub const OBSTACLE_PLACEMENT_ATTEMPTS: u32 = 100;

/// Chebyshev radius around the start head kept free of obstacles.
pub const SAFE_ZONE_RADIUS: i32 = 3;

/// Target band for the combined count of single-cell obstacles.
pub const SMALL_OBSTACLE_MIN: u32 = 5;
pub const SMALL_OBSTACLE_MAX: u32 = 6;

/// A move sound is emitted on every n-th move.
pub const MOVE_SOUND_EVERY: u64 = 10;

/// How long the tongue stays out when it flicks.
pub const TONGUE_FLICK_MS: u64 = 200;

/// Bounds of the random pause between two tongue flicks.
pub const TONGUE_PAUSE_MIN_MS: u64 = 10_000;
pub const TONGUE_PAUSE_MAX_MS: u64 = 15_000;

/// Knockback magnitude in cells.
pub const KNOCKBACK_CELLS: f32 = 1.5;

/// Peak shake amplitude in cells.
pub const SHAKE_CELLS: f32 = 1.0;

/// Shake direction flips this often during the hit animation.
pub const SHAKE_PERIOD_MS: u128 = 50;

/// Number of inter-frame samples in the FPS window.
pub const FPS_SAMPLE_WINDOW: usize = 30;

/// Average FPS at or above which rendering runs at the full rate.
pub const FPS_HEALTHY: f64 = 45.0;

/// Average FPS below which rendering drops to the minimal rate.
pub const FPS_DEGRADED: f64 = 30.0;

pub const RENDER_HZ_FULL: u32 = 60;
pub const RENDER_HZ_REDUCED: u32 = 45;
pub const RENDER_HZ_MINIMAL: u32 = 30;

/// How long the host waits for input before running a frame.
pub const INPUT_POLL_INTERVAL_MS: u64 = 4;

/// User-editable settings loaded from `settings.json`.
///
/// Every field is optional in the file; absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: u16,
    pub grid_height: u16,
    pub tick_interval_ms: u64,
    pub hit_animation_ms: u64,
    pub muted: bool,
    pub skin: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            hit_animation_ms: DEFAULT_HIT_ANIMATION_MS,
            muted: false,
            skin: None,
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the platform config dir when `None`.
    ///
    /// A missing file yields defaults. A file that exists but does not parse
    /// or validate is an error so it can be reported before raw mode.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => settings_path(),
        };
        let settings = load_settings_from_path(&path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges that the engine relies on.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_GRID_WIDTH..=MAX_GRID_WIDTH).contains(&self.grid_width)
            || !(MIN_GRID_HEIGHT..=MAX_GRID_HEIGHT).contains(&self.grid_height)
        {
            return Err(AppError::InvalidSettings(format!(
                "grid {}x{} is outside {MIN_GRID_WIDTH}x{MIN_GRID_HEIGHT}..={MAX_GRID_WIDTH}x{MAX_GRID_HEIGHT}",
                self.grid_width, self.grid_height
            )));
        }

        if self.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(AppError::InvalidSettings(format!(
                "tick_interval_ms {} is below {MIN_TICK_INTERVAL_MS}",
                self.tick_interval_ms
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        GridSize {
            width: self.grid_width,
            height: self.grid_height,
        }
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn hit_animation(&self) -> Duration {
        Duration::from_millis(self.hit_animation_ms)
    }
}

/// Returns the platform-correct settings file path.
#[must_use]
pub fn settings_path() -> PathBuf {
    app_dir(dirs::config_dir()).join(SETTINGS_FILE_NAME)
}

/// Returns the per-user data directory used for scores and logs.
#[must_use]
pub fn data_dir() -> PathBuf {
    app_dir(dirs::data_local_dir())
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

fn load_settings_from_path(path: &Path) -> Result<Settings, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(AppError::Io(e)),
    };

    serde_json::from_str::<Settings>(&raw).map_err(|source| AppError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, Settings};
    use crate::error::AppError;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let path = unique_test_path("missing");

        let settings = Settings::load(Some(&path)).expect("missing file should load defaults");

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.grid_width, DEFAULT_GRID_WIDTH);
        assert_eq!(settings.grid_height, DEFAULT_GRID_HEIGHT);
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let path = unique_test_path("partial");
        write_file(&path, r#"{ "tick_interval_ms": 90, "muted": true }"#);

        let settings = Settings::load(Some(&path)).expect("partial file should parse");

        assert_eq!(settings.tick_interval_ms, 90);
        assert!(settings.muted);
        assert_eq!(settings.grid_width, DEFAULT_GRID_WIDTH);
        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let path = unique_test_path("malformed");
        write_file(&path, "{ not json");

        let result = Settings::load(Some(&path));

        assert!(matches!(result, Err(AppError::Settings { .. })));
        cleanup_test_path(&path);
    }

    #[test]
    fn undersized_grid_is_rejected() {
        let settings = Settings {
            grid_width: 10,
            ..Settings::default()
        };

        assert!(matches!(
            settings.validate(),
            Err(AppError::InvalidSettings(_))
        ));
    }

    #[test]
    fn too_fast_tick_is_rejected() {
        let settings = Settings {
            tick_interval_ms: 5,
            ..Settings::default()
        };

        assert!(settings.validate().is_err());
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
            .join("jungle-snake-settings-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
