//! # Height Field Module
//!
//! Maps a 2D world coordinate to a terrain height using fractal Perlin noise.
//!
//! The generator is a plain value: it holds no mutable state after construction,
//! so a single instance can be shared read-only across chunks and worker threads.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::{config::TerrainConfig, engine_state::voxels::chunk::CHUNK_HEIGHT};

/// A seeded, multi-octave terrain height function.
#[derive(Clone, Debug)]
pub struct HeightField {
    noise: Fbm<Perlin>,
    frequency: f64,
    min_height: i32,
    max_height: i32,
}

impl HeightField {
    /// Builds the generator described by `config`.
    ///
    /// The config is expected to have passed [`TerrainConfig::validate`]; heights are
    /// clamped into the chunk regardless.
    pub fn new(config: &TerrainConfig) -> Self {
        HeightField {
            noise: Fbm::<Perlin>::new(config.seed).set_octaves(config.octaves),
            frequency: config.frequency,
            min_height: config.min_height,
            max_height: config.max_height,
        }
    }

    /// Samples the noise at a world coordinate, renormalised into `[0, 1]`.
    pub fn sample(&self, world_x: f64, world_z: f64) -> f64 {
        let scaled = [world_x / self.frequency, world_z / self.frequency];
        let value = self.noise.get(scaled);
        ((value + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Terrain height at a world column, always within `[1, CHUNK_HEIGHT - 1]`.
    ///
    /// # Arguments
    /// * `world_x` - World-space X of the column
    /// * `world_z` - World-space Z of the column
    ///
    /// # Returns
    /// The number of solid blocks the column should contain, counting up from `y = 0`.
    pub fn height_at(&self, world_x: f64, world_z: f64) -> i32 {
        let span = f64::from(self.max_height - self.min_height);
        let height = f64::from(self.min_height) + span * self.sample(world_x, world_z);
        (height as i32).clamp(1, CHUNK_HEIGHT as i32 - 1)
    }
}

impl Default for HeightField {
    fn default() -> Self {
        Self::new(&TerrainConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_parameters_give_same_heights() {
        let a = HeightField::default();
        let b = HeightField::default();
        for (x, z) in [(0.0, 0.0), (13.5, -7.25), (-1024.0, 333.0), (1e6, -1e6)] {
            assert_eq!(a.height_at(x, z), b.height_at(x, z));
            assert_eq!(a.height_at(x, z), a.height_at(x, z));
        }
    }

    #[test]
    fn heights_stay_inside_the_chunk() {
        let field = HeightField::default();
        for x in -64..64 {
            for z in -64..64 {
                let height = field.height_at(f64::from(x) * 3.7, f64::from(z) * 5.3);
                assert!((1..CHUNK_HEIGHT as i32).contains(&height), "height {height}");
            }
        }
    }

    #[test]
    fn extreme_height_range_is_clamped() {
        let config = TerrainConfig {
            min_height: -500,
            max_height: 500,
            ..TerrainConfig::default()
        };
        let field = HeightField::new(&config);
        for x in 0..200 {
            let height = field.height_at(f64::from(x) * 11.0, 17.0);
            assert!((1..=CHUNK_HEIGHT as i32 - 1).contains(&height));
        }
    }

    #[test]
    fn sample_is_normalised() {
        let field = HeightField::new(&TerrainConfig {
            octaves: 8,
            frequency: 3.0,
            ..TerrainConfig::default()
        });
        for x in 0..500 {
            let value = field.sample(f64::from(x) * 0.91, f64::from(x) * -1.3);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn terrain_varies_across_the_world() {
        let field = HeightField::default();
        let first = field.height_at(0.5, 0.5);
        assert!((0..64).any(|i| field.height_at(f64::from(i) * 16.5, 0.5) != first));
    }
}
