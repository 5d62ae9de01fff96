//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here. Values can be overridden from a
//! TOML file; missing keys fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{Result, SimError};

/// Configuration for the simulation systems
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === OBSTACLES ===
    /// Number of autonomous obstacles placed at startup
    pub obstacle_count: usize,

    /// Sleep between two moves of the same obstacle (milliseconds)
    ///
    /// Each worker polls its termination flag once per interval, so this
    /// also bounds how long `terminate` can block.
    pub obstacle_interval_ms: u64,

    // === SCREEN ===
    /// Sleep between two full refreshes of every panel (milliseconds)
    pub refresh_interval_ms: u64,

    // === SENSORS ===
    /// Cells within this distance of the avatar are highlighted by the camera
    pub camera_range: f64,

    /// Agents farther than this from the motion detector are ignored
    pub motion_radius: f64,

    /// Motion entries closer than this are logged with the alarm color
    pub motion_close: f64,

    // === STOP CONDITIONS ===
    /// Collisions tolerated before the run stops
    pub collision_limit: u32,

    // === PANELS ===
    /// Rows of the menu panel shown below the map
    pub menu_height: usize,

    /// Columns of the menu panel
    pub menu_width: usize,

    /// Total width of the log board to the right of the map
    pub log_width: usize,

    /// Number of fixed-width columns the log board is split into
    pub log_columns: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            obstacle_count: 3,
            obstacle_interval_ms: 1000,

            refresh_interval_ms: 1000,

            camera_range: 3.5,
            motion_radius: 5.0,
            motion_close: 3.5,

            collision_limit: 5,

            menu_height: 4,
            menu_width: 110,
            log_width: 94,
            log_columns: 4,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file and validate it
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn obstacle_interval(&self) -> Duration {
        Duration::from_millis(self.obstacle_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Width of one log board column
    pub fn log_column_width(&self) -> usize {
        self.log_width / self.log_columns.max(1)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.obstacle_interval_ms == 0 || self.refresh_interval_ms == 0 {
            return Err(SimError::Configuration(
                "worker intervals must be at least 1 ms".into(),
            ));
        }

        if self.camera_range <= 0.0 || self.motion_radius <= 0.0 {
            return Err(SimError::Configuration(
                "sensor ranges must be positive".into(),
            ));
        }

        if self.motion_close > self.motion_radius {
            return Err(SimError::Configuration(format!(
                "motion_close ({}) should be <= motion_radius ({})",
                self.motion_close, self.motion_radius
            )));
        }

        if self.collision_limit == 0 {
            return Err(SimError::Configuration(
                "collision_limit must be at least 1".into(),
            ));
        }

        if self.log_columns == 0 || self.log_column_width() == 0 {
            return Err(SimError::Configuration(format!(
                "log board of width {} cannot hold {} columns",
                self.log_width, self.log_columns
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_column_width(), 23);
        assert_eq!(config.obstacle_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            "obstacle_count = 7\nrefresh_interval_ms = 50\n",
        )
        .unwrap();
        assert_eq!(config.obstacle_count, 7);
        assert_eq!(config.refresh_interval_ms, 50);
        assert_eq!(config.collision_limit, 5);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = SimulationConfig {
            motion_close: 9.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = SimulationConfig::from_toml_str("obstacle_count = \"many\"");
        assert!(matches!(result, Err(SimError::TomlError(_))));
    }
}
