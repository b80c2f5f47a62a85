//! # Error Types
//!
//! Typed errors for the voxel terrain engine. Block access violations are
//! caller bugs and are reported with the offending coordinates; configuration
//! errors wrap the underlying I/O or JSON failure.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by checked block access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Local block coordinates outside the chunk extents.
    #[error("block coordinate ({x}, {y}, {z}) is out of bounds")]
    OutOfBounds {
        /// Requested x.
        x: usize,
        /// Requested y.
        y: usize,
        /// Requested z.
        z: usize,
    },
}

/// Errors raised while loading or validating an [`crate::config::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for the config schema.
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but its values are unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error returned by [`crate::run`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
