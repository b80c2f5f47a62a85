//! # Configuration
//!
//! Runtime tunables for terrain generation and world streaming, loaded from JSON.
//!
//! Every field has a default, so a config file only needs to name the values it
//! overrides:
//!
//! ```json
//! { "terrain": { "seed": 7, "octaves": 6 }, "world": { "view_radius": 4 } }
//! ```
//!
//! Chunk extents are not configurable at runtime; see
//! [`crate::engine_state::voxels::chunk::CHUNK_WIDTH`] and friends.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{engine_state::voxels::chunk::CHUNK_HEIGHT, error::ConfigError};

/// Upper bound on octave count accepted by the fractal noise source.
pub const MAX_OCTAVES: usize = 32;

/// Parameters of the height-field generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed of the underlying Perlin permutation tables.
    pub seed: u32,
    /// World coordinates are divided by this before sampling noise.
    pub frequency: f64,
    /// Number of noise layers summed per sample.
    pub octaves: usize,
    /// Terrain height where the noise value is 0.
    pub min_height: i32,
    /// Terrain height where the noise value is 1.
    pub max_height: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            seed: 0,
            frequency: 64.0,
            octaves: 4,
            min_height: 10,
            max_height: CHUNK_HEIGHT as i32 - 10,
        }
    }
}

impl TerrainConfig {
    /// Checks that the parameters describe a usable height field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "terrain.frequency must be a positive number, got {}",
                self.frequency
            )));
        }
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(ConfigError::Invalid(format!(
                "terrain.octaves must be within 1..={MAX_OCTAVES}, got {}",
                self.octaves
            )));
        }
        let ceiling = CHUNK_HEIGHT as i32 - 1;
        if self.min_height < 1 || self.max_height > ceiling || self.min_height >= self.max_height {
            return Err(ConfigError::Invalid(format!(
                "terrain heights must satisfy 1 <= min_height < max_height <= {ceiling}, got {}..{}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }
}

/// Parameters of chunk streaming and the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chebyshev radius, in chunks, streamed around the viewer.
    pub view_radius: u32,
    /// Number of chunks kept loaded before the least recently used is evicted.
    pub max_loaded_chunks: usize,
    /// Worker threads for generation and meshing. `0` uses the available parallelism.
    pub worker_threads: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            view_radius: 2,
            max_loaded_chunks: 256,
            worker_threads: 0,
        }
    }
}

impl WorldConfig {
    /// Resolves `worker_threads`, substituting the machine's parallelism for `0`.
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Height-field generation.
    pub terrain: TerrainConfig,
    /// Streaming and threading.
    pub world: WorldConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loading config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        if self.world.max_loaded_chunks == 0 {
            return Err(ConfigError::Invalid(
                "world.max_loaded_chunks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_canonical() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.terrain.min_height, 10);
        assert_eq!(config.terrain.max_height, 54);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "terrain": { "seed": 7 }, "world": { "view_radius": 4 } }"#)
                .unwrap();
        assert_eq!(config.terrain.seed, 7);
        assert_eq!(config.terrain.octaves, TerrainConfig::default().octaves);
        assert_eq!(config.world.view_radius, 4);
        assert_eq!(config.world.max_loaded_chunks, 256);
    }

    #[test]
    fn rejects_unusable_values() {
        for json in [
            r#"{ "terrain": { "frequency": 0.0 } }"#,
            r#"{ "terrain": { "octaves": 0 } }"#,
            r#"{ "terrain": { "octaves": 33 } }"#,
            r#"{ "terrain": { "min_height": 30, "max_height": 30 } }"#,
            r#"{ "terrain": { "max_height": 64 } }"#,
            r#"{ "terrain": { "min_height": 0 } }"#,
            r#"{ "world": { "max_loaded_chunks": 0 } }"#,
        ] {
            assert!(
                matches!(EngineConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ terrain: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::from_json_file("/nonexistent/voxel-terrain.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn explicit_worker_count_wins() {
        let world = WorldConfig {
            worker_threads: 3,
            ..WorldConfig::default()
        };
        assert_eq!(world.resolved_worker_threads(), 3);
        assert!(WorldConfig::default().resolved_worker_threads() >= 1);
    }
}
