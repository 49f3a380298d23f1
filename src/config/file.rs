//! Configuration file management for specfall.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `specfall list-devices`
    /// - device name from `specfall list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested capture sample rate in Hz (actual rate depends on the device)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Visualization configuration shared by the waveform and waterfall views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Points per rendered strip. Must be a power of two (FFT size is 2x this).
    #[serde(default = "default_points")]
    pub points: usize,
    /// Maximum retained waterfall rows before the oldest is evicted
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Sampling tick interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Initial cutoff threshold in [0,1]; values above it paint in the alert color
    #[serde(default = "default_cutoff")]
    pub cutoff: f32,
    /// Spectral smoothing factor in [0,1) applied between sampling ticks
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Drive cutoff and horizontal zoom from slow sine oscillators
    #[serde(default = "default_true")]
    pub oscillate: bool,
}

fn default_points() -> usize {
    256
}

fn default_history_depth() -> usize {
    100
}

fn default_tick_ms() -> u64 {
    50
}

fn default_cutoff() -> f32 {
    0.8
}

fn default_smoothing() -> f32 {
    0.1
}

fn default_true() -> bool {
    true
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
            history_depth: default_history_depth(),
            tick_ms: default_tick_ms(),
            cutoff: default_cutoff(),
            smoothing: default_smoothing(),
            oscillate: default_true(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecfallConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl SpecfallConfig {
    /// Loads configuration from the user's config directory, creating a
    /// default config file on first run.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the TOML is malformed
    /// - If a setting fails validation
    pub fn load() -> Result<Self, anyhow::Error> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            let config = SpecfallConfig::default();
            config.save()?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: SpecfallConfig = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Returns the path of the config file, creating its directory if needed.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    pub fn path() -> anyhow::Result<PathBuf> {
        Ok(get_config_path()?)
    }

    /// Validates settings that would otherwise fail deep inside the pipeline.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.view.points == 0 || !self.view.points.is_power_of_two() {
            return Err(anyhow!(
                "view.points must be a power of two (got {})",
                self.view.points
            ));
        }
        if self.view.history_depth == 0 {
            return Err(anyhow!("view.history_depth must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.view.cutoff) {
            return Err(anyhow!(
                "view.cutoff must be within [0, 1] (got {})",
                self.view.cutoff
            ));
        }
        if !(0.0..1.0).contains(&self.view.smoothing) {
            return Err(anyhow!(
                "view.smoothing must be within [0, 1) (got {})",
                self.view.smoothing
            ));
        }
        if self.view.tick_ms == 0 {
            return Err(anyhow!("view.tick_ms must be at least 1"));
        }
        Ok(())
    }
}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = config_dir
        .join(".config")
        .join("specfall")
        .join("specfall.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SpecfallConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view.points, 256);
        assert_eq!(config.view.history_depth, 100);
    }

    #[test]
    fn test_points_must_be_power_of_two() {
        let mut config = SpecfallConfig::default();
        config.view.points = 300;
        assert!(config.validate().is_err());
        config.view.points = 128;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cutoff_bounds() {
        let mut config = SpecfallConfig::default();
        config.view.cutoff = 1.5;
        assert!(config.validate().is_err());
        config.view.cutoff = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SpecfallConfig = toml::from_str("[audio]\ndevice = \"1\"\n").unwrap();
        assert_eq!(config.audio.device, "1");
        assert_eq!(config.view.points, 256);
        assert!(config.view.oscillate);
    }
}
