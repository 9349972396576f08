//! Configuration for SmolDB
//!
//! Construction-time settings for a [`Store`](crate::Store) with sensible
//! defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmolError};

/// Highest zlib level accepted by the codec
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Main configuration for a Store instance
#[derive(Debug, Clone)]
pub struct Config {
    /// File used by save/load
    pub filename: PathBuf,

    /// Compression applied on save
    pub compression: Compression,
}

/// Compression settings persisted alongside the entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compression {
    /// Route encoded bytes through zlib on save
    pub enabled: bool,

    /// zlib level (0-9), only meaningful when `enabled`
    pub level: u32,
}

impl Compression {
    /// No compression, level 0
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Compression enabled at the given level
    pub fn with_level(level: u32) -> Self {
        Self {
            enabled: true,
            level,
        }
    }

    /// Reject levels zlib cannot be configured with.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.level > MAX_COMPRESSION_LEVEL {
            return Err(SmolError::InvalidCompressionLevel(self.level));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("./smol.db"),
            compression: Compression::disabled(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the file used for persistence
    pub fn filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.filename = path.into();
        self
    }

    /// Enable compression at the given level
    pub fn compression_level(mut self, level: u32) -> Self {
        self.config.compression = Compression::with_level(level);
        self
    }

    /// Turn compression off
    pub fn no_compression(mut self) -> Self {
        self.config.compression = Compression::disabled();
        self
    }

    /// Validate and return the config
    pub fn build(self) -> Result<Config> {
        if self.config.filename.as_os_str().is_empty() {
            return Err(SmolError::Config("filename must not be empty".to_string()));
        }
        self.config.compression.validate()?;
        Ok(self.config)
    }
}
