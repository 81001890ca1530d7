//! Simulation configuration resource.
//!
//! Holds the physics and player tuning loaded from an INI configuration
//! file. Defaults reproduce the reference tuning so the simulation can start
//! without a file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! gravity = 600
//! tile_width = 50
//! tile_height = 50
//! ground_probe = 1
//! underneath_probe = 10
//! fall_limit_tiles = 6
//!
//! [player]
//! jump_strength = 400
//! flutter_strength = 500
//! move_speed = 8
//! max_walk_speed = 3000
//! traction = 350
//!
//! [simulation]
//! tick_ms = 16
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::IVec2;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_GRAVITY: f32 = 600.0;
const DEFAULT_TILE_WIDTH: u32 = 50;
const DEFAULT_TILE_HEIGHT: u32 = 50;
const DEFAULT_GROUND_PROBE: f32 = 1.0;
const DEFAULT_UNDERNEATH_PROBE: f32 = 10.0;
const DEFAULT_FALL_LIMIT_TILES: u32 = 6;
const DEFAULT_JUMP_STRENGTH: f32 = 400.0;
const DEFAULT_FLUTTER_STRENGTH: f32 = 500.0;
const DEFAULT_MOVE_SPEED: f32 = 8.0;
const DEFAULT_MAX_WALK_SPEED: f32 = 3000.0;
const DEFAULT_TRACTION: f32 = 350.0;
const DEFAULT_TICK_MS: u32 = 16;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Simulation configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Downward acceleration applied to airborne actors, px/s².
    pub gravity: f32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Distance below the bottom edge probed for the grounded check.
    pub ground_probe: f32,
    /// Distance below the bottom edge probed for trigger tiles.
    pub underneath_probe: f32,
    /// How many tiles below the map the player may fall before dying.
    pub fall_limit_tiles: u32,
    pub jump_strength: f32,
    pub flutter_strength: f32,
    pub move_speed: f32,
    pub max_walk_speed: f32,
    pub traction: f32,
    /// Fixed tick length used by drivers that do not measure frame time.
    pub tick_ms: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            ground_probe: DEFAULT_GROUND_PROBE,
            underneath_probe: DEFAULT_UNDERNEATH_PROBE,
            fall_limit_tiles: DEFAULT_FALL_LIMIT_TILES,
            jump_strength: DEFAULT_JUMP_STRENGTH,
            flutter_strength: DEFAULT_FLUTTER_STRENGTH,
            move_speed: DEFAULT_MOVE_SPEED,
            max_walk_speed: DEFAULT_MAX_WALK_SPEED,
            traction: DEFAULT_TRACTION,
            tick_ms: DEFAULT_TICK_MS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn tile_size(&self) -> IVec2 {
        IVec2::new(self.tile_width as i32, self.tile_height as i32)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        let float = |section: &str, key: &str| {
            config
                .getfloat(section, key)
                .ok()
                .flatten()
                .map(|v| v as f32)
        };
        let uint = |section: &str, key: &str| {
            config
                .getuint(section, key)
                .ok()
                .flatten()
                .map(|v| v as u32)
        };

        // [physics] section
        if let Some(gravity) = float("physics", "gravity") {
            self.gravity = gravity;
        }
        if let Some(width) = uint("physics", "tile_width").filter(|w| *w > 0) {
            self.tile_width = width;
        }
        if let Some(height) = uint("physics", "tile_height").filter(|h| *h > 0) {
            self.tile_height = height;
        }
        if let Some(probe) = float("physics", "ground_probe") {
            self.ground_probe = probe;
        }
        if let Some(probe) = float("physics", "underneath_probe") {
            self.underneath_probe = probe;
        }
        if let Some(limit) = uint("physics", "fall_limit_tiles") {
            self.fall_limit_tiles = limit;
        }

        // [player] section
        if let Some(strength) = float("player", "jump_strength") {
            self.jump_strength = strength;
        }
        if let Some(strength) = float("player", "flutter_strength") {
            self.flutter_strength = strength;
        }
        if let Some(speed) = float("player", "move_speed") {
            self.move_speed = speed;
        }
        if let Some(speed) = float("player", "max_walk_speed") {
            self.max_walk_speed = speed;
        }
        if let Some(traction) = float("player", "traction") {
            self.traction = traction;
        }

        // [simulation] section
        if let Some(tick) = uint("simulation", "tick_ms").filter(|t| *t > 0) {
            self.tick_ms = tick;
        }

        info!(
            "Loaded config: gravity={}, tiles={}x{}, probes={}/{}, jump={}, flutter={}, tick={}ms",
            self.gravity,
            self.tile_width,
            self.tile_height,
            self.ground_probe,
            self.underneath_probe,
            self.jump_strength,
            self.flutter_strength,
            self.tick_ms
        );
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [physics] section
        config.set("physics", "gravity", Some(self.gravity.to_string()));
        config.set("physics", "tile_width", Some(self.tile_width.to_string()));
        config.set("physics", "tile_height", Some(self.tile_height.to_string()));
        config.set("physics", "ground_probe", Some(self.ground_probe.to_string()));
        config.set(
            "physics",
            "underneath_probe",
            Some(self.underneath_probe.to_string()),
        );
        config.set(
            "physics",
            "fall_limit_tiles",
            Some(self.fall_limit_tiles.to_string()),
        );

        // [player] section
        config.set("player", "jump_strength", Some(self.jump_strength.to_string()));
        config.set(
            "player",
            "flutter_strength",
            Some(self.flutter_strength.to_string()),
        );
        config.set("player", "move_speed", Some(self.move_speed.to_string()));
        config.set(
            "player",
            "max_walk_speed",
            Some(self.max_walk_speed.to_string()),
        );
        config.set("player", "traction", Some(self.traction.to_string()));

        // [simulation] section
        config.set("simulation", "tick_ms", Some(self.tick_ms.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert!(approx_eq(config.gravity, 600.0));
        assert_eq!(config.tile_size(), IVec2::new(50, 50));
        assert!(approx_eq(config.ground_probe, 1.0));
        assert!(approx_eq(config.underneath_probe, 10.0));
        assert!(approx_eq(config.jump_strength, 400.0));
        assert!(approx_eq(config.flutter_strength, 500.0));
        assert_eq!(config.fall_limit_tiles, 6);
        assert_eq!(config.tick_ms, 16);
    }

    #[test]
    fn test_partial_ini_keeps_defaults() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[physics]\ngravity = 980.5\n\n[player]\njump_strength = 320\n")
            .unwrap();
        assert!(approx_eq(config.gravity, 980.5));
        assert!(approx_eq(config.jump_strength, 320.0));
        assert!(approx_eq(config.traction, 350.0));
        assert_eq!(config.tile_width, 50);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let mut config = GameConfig::new();
        let text = "[physics]\ngravity = heavy\ntile_width = 0\n[simulation]\ntick_ms = 0\n";
        config.load_from_str(text).unwrap();
        assert!(approx_eq(config.gravity, 600.0));
        assert_eq!(config.tile_width, 50);
        assert_eq!(config.tick_ms, 16);
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut config = GameConfig::with_path("/nonexistent/tileplat/config.ini");
        assert!(config.load_from_file().is_err());
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!("tileplat-config-{}.ini", std::process::id()));
        let mut saved = GameConfig::with_path(&path);
        saved.gravity = 750.0;
        saved.tick_ms = 10;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(approx_eq(loaded.gravity, 750.0));
        assert_eq!(loaded.tick_ms, 10);
    }
}
