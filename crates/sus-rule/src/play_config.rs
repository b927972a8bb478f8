use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::judge_property::{JudgeWindows, ScoreTable};

/// Vertical position where notes appear.
pub const DEFAULT_SPAWN_Y: f64 = 175.0;
/// Vertical position of the judgement line.
pub const DEFAULT_JUDGE_Y: f64 = -4.5;
/// Seconds a note takes from spawn to the judgement line.
pub const DEFAULT_TRAVEL_TIME: f64 = 2.0;

pub const SCROLL_SPEED_MIN: f64 = 0.01;
pub const SCROLL_SPEED_MAX: f64 = 10_000.0;
pub const TRAVEL_TIME_MIN: f64 = 0.1;
pub const TRAVEL_TIME_MAX: f64 = 20.0;
pub const RELEASE_GRACE_MIN: f64 = 0.0;
pub const RELEASE_GRACE_MAX: f64 = 5.0;

/// Position units per second for a note travelling `spawn_y -> judge_y` in `travel_time`.
pub fn scroll_speed_for(spawn_y: f64, judge_y: f64, travel_time: f64) -> f64 {
    (judge_y - spawn_y).abs() / travel_time
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayConfig {
    pub windows: JudgeWindows,
    pub scores: ScoreTable,
    /// Position units per second; converts timing offsets into window distances
    pub scroll_speed: f64,
    /// Seconds between a note's registration and its time
    pub note_travel_time: f64,
    /// Seconds past a hold's end before it is forcibly ended
    pub hold_release_grace: f64,
    /// Register notes automatically once they are `note_travel_time` away
    pub auto_register: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            windows: JudgeWindows::default(),
            scores: ScoreTable::default(),
            scroll_speed: scroll_speed_for(DEFAULT_SPAWN_Y, DEFAULT_JUDGE_Y, DEFAULT_TRAVEL_TIME),
            note_travel_time: DEFAULT_TRAVEL_TIME,
            hold_release_grace: 0.3,
            auto_register: true,
        }
    }
}

impl PlayConfig {
    pub fn validate(&mut self) {
        let defaults = PlayConfig::default();
        self.windows.validate();
        self.scroll_speed = clamp_or(
            self.scroll_speed,
            SCROLL_SPEED_MIN,
            SCROLL_SPEED_MAX,
            defaults.scroll_speed,
        );
        self.note_travel_time = clamp_or(
            self.note_travel_time,
            TRAVEL_TIME_MIN,
            TRAVEL_TIME_MAX,
            defaults.note_travel_time,
        );
        self.hold_release_grace = clamp_or(
            self.hold_release_grace,
            RELEASE_GRACE_MIN,
            RELEASE_GRACE_MAX,
            defaults.hold_release_grace,
        );
    }

    /// Seconds of timing offset covered by a window distance.
    pub fn window_seconds(&self, distance: f64) -> f64 {
        distance / self.scroll_speed
    }

    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.validate();
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn clamp_or(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = PlayConfig::default();
        assert_eq!(config.scroll_speed, 89.75);
        assert_eq!(config.note_travel_time, 2.0);
        assert_eq!(config.hold_release_grace, 0.3);
        assert!(config.auto_register);
        assert_eq!(config.windows, JudgeWindows::default());
        assert_eq!(config.scores.miss, -20);
        assert_eq!(config.scores.hold_tick, 10);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = PlayConfig {
            scroll_speed: -1.0,
            note_travel_time: f64::INFINITY,
            hold_release_grace: 99.0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.scroll_speed, SCROLL_SPEED_MIN);
        assert_eq!(config.note_travel_time, DEFAULT_TRAVEL_TIME);
        assert_eq!(config.hold_release_grace, RELEASE_GRACE_MAX);
    }

    #[test]
    fn test_window_seconds() {
        let config = PlayConfig {
            scroll_speed: 10.0,
            ..Default::default()
        };
        assert_eq!(config.window_seconds(2.5), 0.25);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_string(&PlayConfig::default()).unwrap();
        assert!(json.contains("\"scrollSpeed\""));
        assert!(json.contains("\"holdReleaseGrace\""));
        assert!(json.contains("\"holdTick\""));
    }

    #[test]
    fn test_file_io() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("play.json");

        let config = PlayConfig {
            scroll_speed: 40.0,
            hold_release_grace: 0.5,
            auto_register: false,
            ..Default::default()
        };

        config.save_to(&file_path).unwrap();
        let loaded = PlayConfig::load_from(&file_path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nonexistent.json");

        let config = PlayConfig::load_from(&file_path).unwrap();
        assert_eq!(config, PlayConfig::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.json");
        fs::write(&file_path, r#"{"windows": {"perfect": 3.0}}"#).unwrap();

        let config = PlayConfig::load_from(&file_path).unwrap();
        assert_eq!(config.windows.perfect, 3.0);
        // validate() keeps windows ordered
        assert_eq!(config.windows.great, 3.0);
        assert_eq!(config.scroll_speed, 89.75);
    }
}
