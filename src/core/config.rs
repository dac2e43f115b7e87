use crate::models::pose::PoseThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Frames per second to pace playback at
    pub target_fps: u32,
    /// Pace frames in real time; when false, replay as fast as possible
    pub realtime: bool,
    /// Capacity of the frame and event channels
    pub event_buffer: usize,
    /// Pose rule margins
    pub thresholds: PoseThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_fps: 15,
            realtime: true,
            event_buffer: 100,
            thresholds: PoseThresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config and save it
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.target_fps == 0 || self.target_fps > 60 {
            return Err(format!(
                "Invalid target FPS: {}. Must be between 1 and 60",
                self.target_fps
            )
            .into());
        }

        if self.event_buffer == 0 || self.event_buffer > 10_000 {
            return Err(format!(
                "Invalid event buffer: {}. Must be between 1 and 10000",
                self.event_buffer
            )
            .into());
        }

        self.thresholds.validate()?;

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Time between frames at the target rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Get the configuration file path
    fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".posecam");
        path.push("settings.json");

        Ok(path)
    }
}
