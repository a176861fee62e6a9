//! Engine configuration persistence
//!
//! Reads and writes the engine parameters as simple `key=value` lines.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{ConfigError, SetupError};
use crate::setup::Setup;
use crate::window::Window;

/// Engine configuration as read from disk, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub fft_size: u32,
    pub overlap_factor: u32,
    pub sample_rate: u32,
    pub window: Window,
    pub channels: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            overlap_factor: 4,
            sample_rate: 44100,
            window: Window::Hann,
            channels: 2,
        }
    }
}

impl EngineConfig {
    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), ?config, "Loaded engine configuration");
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())?;
        Ok(())
    }

    /// Parse config from simple key=value format
    ///
    /// Missing keys keep their defaults, unknown keys are skipped.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warn!(line = index + 1, "Ignoring config line without '='");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "fft_size" => config.fft_size = parse_value(index, key, value)?,
                "overlap_factor" => config.overlap_factor = parse_value(index, key, value)?,
                "sample_rate" => config.sample_rate = parse_value(index, key, value)?,
                "channels" => config.channels = parse_value(index, key, value)?,
                "window" => {
                    config.window = Window::from_name(value)
                        .ok_or_else(|| ConfigError::UnknownWindow(value.to_string()))?;
                }
                _ => warn!(key, "Ignoring unknown config key"),
            }
        }

        Ok(config)
    }

    /// Serialize config to simple key=value format
    pub fn serialize(&self) -> String {
        [
            "# SWX engine configuration".to_string(),
            format!("fft_size={}", self.fft_size),
            format!("overlap_factor={}", self.overlap_factor),
            format!("sample_rate={}", self.sample_rate),
            format!("window={}", self.window.name()),
            format!("channels={}", self.channels),
        ]
        .join("\n")
    }

    /// Validate into an engine setup
    pub fn to_setup(&self) -> Result<Setup, SetupError> {
        if self.channels == 0 {
            return Err(SetupError::InvalidChannelCount);
        }
        Setup::new(
            self.fft_size,
            self.overlap_factor,
            self.sample_rate,
            self.window,
        )
    }
}

fn parse_value<T: FromStr>(index: usize, key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        line: index + 1,
        key: key.to_string(),
        value: value.to_string(),
    })
}
