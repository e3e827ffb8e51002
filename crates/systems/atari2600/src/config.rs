//! System configuration
//!
//! Loaded from JSON; every field has a default so a partial file works.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::bus::{BusError, MemoryMap};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("clocks_per_cpu_cycle must be at least 1")]
    ZeroClockRatio,
    #[error("visible_lines ({visible}) must be between 1 and max_scanlines_per_frame ({max})")]
    VisibleLines { visible: u16, max: u16 },
    #[error("Memory map: {0}")]
    MemoryMap(#[from] BusError),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// TIA color clocks per CPU cycle.
    pub clocks_per_cpu_cycle: u32,
    pub memory_map: MemoryMap,
    /// Consecutive illegal opcodes tolerated before emulation stops.
    /// 0 never stops.
    pub illegal_opcode_limit: u32,
    /// Height of the output frame.
    pub visible_lines: u16,
    /// Scanlines after which a frame ends even without VSYNC.
    pub max_scanlines_per_frame: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            clocks_per_cpu_cycle: 3,
            memory_map: MemoryMap::default(),
            illegal_opcode_limit: 16,
            visible_lines: 192,
            max_scanlines_per_frame: 312,
        }
    }
}

impl SystemConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clocks_per_cpu_cycle == 0 {
            return Err(ConfigError::ZeroClockRatio);
        }
        if self.visible_lines == 0 || self.visible_lines > self.max_scanlines_per_frame {
            return Err(ConfigError::VisibleLines {
                visible: self.visible_lines,
                max: self.max_scanlines_per_frame,
            });
        }
        self.memory_map.validate()?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
