//! Game settings, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::SUPPORTED_SIZES;
use crate::hand::HandLimits;
use crate::layout::Layout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// 6, 8 or 10.
    pub board_size: u8,
    pub active_capacity: usize,
    pub storage_capacity: usize,
    pub active_per_side: usize,
    /// Turns between card redistributions; `0` disables them.
    pub redistribution_interval: u32,
    pub seed: u64,
    /// Custom placement string; must describe a `board_size` board.
    pub layout: Option<String>,
    /// Deal hands when the game is created.
    pub deal_on_start: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        let limits = HandLimits::default();
        Self {
            board_size: 8,
            active_capacity: limits.active_capacity,
            storage_capacity: limits.storage_capacity,
            active_per_side: limits.active_per_side,
            redistribution_interval: limits.redistribution_interval,
            seed: 0,
            layout: None,
            deal_on_start: true,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_SIZES.contains(&self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "board_size must be one of {SUPPORTED_SIZES:?}, got {}",
                self.board_size
            )));
        }
        if self.active_capacity == 0 {
            return Err(ConfigError::Invalid("active_capacity must be positive".into()));
        }
        if self.active_per_side > self.active_capacity {
            return Err(ConfigError::Invalid(format!(
                "active_per_side ({}) exceeds active_capacity ({})",
                self.active_per_side, self.active_capacity
            )));
        }
        if let Some(placement) = &self.layout {
            let layout = Layout::parse(placement)
                .map_err(|e| ConfigError::Invalid(format!("layout: {e}")))?;
            if layout.size != self.board_size {
                return Err(ConfigError::Invalid(format!(
                    "layout describes a {0}x{0} board but board_size is {1}",
                    layout.size, self.board_size
                )));
            }
        }
        Ok(())
    }

    pub fn hand_limits(&self) -> HandLimits {
        HandLimits {
            active_capacity: self.active_capacity,
            storage_capacity: self.storage_capacity,
            active_per_side: self.active_per_side,
            redistribution_interval: self.redistribution_interval,
        }
    }

    /// Layout this config starts from.
    pub fn layout(&self) -> Result<Layout, ConfigError> {
        match &self.layout {
            Some(placement) => {
                Layout::parse(placement).map_err(|e| ConfigError::Invalid(format!("layout: {e}")))
            }
            None => Layout::standard(self.board_size)
                .map_err(|e| ConfigError::Invalid(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
