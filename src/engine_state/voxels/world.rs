//! # World Module
//!
//! This module provides the `World` struct which manages the collection of loaded
//! chunks and routes world-space block access to the chunk that owns each column.
//!
//! ## Architecture
//!
//! Chunks live in an LRU cache bounded by the configured capacity, so streaming
//! around a moving viewer keeps memory flat: inserting past capacity evicts the
//! chunk that was least recently inserted.
//!
//! Each chunk sits behind its own [`MtResource`] lock. Meshing a chunk takes that
//! chunk's write lock, which serialises it against `set_block` on the same chunk
//! while leaving other chunks free.

use std::{num::NonZeroUsize, sync::Arc};

use cgmath::Point2;
use lru::LruCache;

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{neighborhood::ChunkNeighborhood, Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
    height_field::HeightField,
};
use crate::core::MtResource;

/// The set of loaded chunks plus the terrain generator that created them.
pub struct World {
    chunks: LruCache<Point2<i32>, MtResource<Chunk>>,
    height_field: Arc<HeightField>,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Arguments
    /// * `height_field` - Terrain generator shared with generation tasks
    /// * `capacity` - Maximum number of loaded chunks
    pub fn new(height_field: Arc<HeightField>, capacity: NonZeroUsize) -> Self {
        World {
            chunks: LruCache::new(capacity),
            height_field,
        }
    }

    /// The shared terrain generator.
    pub fn height_field(&self) -> Arc<HeightField> {
        self.height_field.clone()
    }

    /// The chunk coordinates owning a world column, using floor division so
    /// negative coordinates land in negative chunks.
    pub fn chunk_position_for(world_x: i32, world_z: i32) -> Point2<i32> {
        Point2::new(
            world_x.div_euclid(CHUNK_WIDTH as i32),
            world_z.div_euclid(CHUNK_DEPTH as i32),
        )
    }

    /// Every chunk position within Chebyshev distance `radius` of `center`,
    /// nearest rings first.
    pub fn chunks_in_radius(center: Point2<i32>, radius: u32) -> Vec<Point2<i32>> {
        let radius = radius as i32;
        let mut positions = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                positions.push(Point2::new(center.x + dx, center.y + dz));
            }
        }
        positions.sort_by_key(|p| ((p.x - center.x).abs().max((p.y - center.y).abs()), p.x, p.y));
        positions
    }

    /// The chunk position on `side` of `position`, for horizontal sides.
    pub fn neighbor_position(position: Point2<i32>, side: BlockSide) -> Option<Point2<i32>> {
        let offset = side.offset();
        if offset.y != 0 {
            return None;
        }
        Some(Point2::new(position.x + offset.x, position.y + offset.z))
    }

    /// Whether a chunk is loaded at `position`.
    pub fn contains_chunk(&self, position: Point2<i32>) -> bool {
        self.chunks.contains(&position)
    }

    /// The chunk at `position`, without touching its recency.
    pub fn get_chunk(&self, position: Point2<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.peek(&position).cloned()
    }

    /// Inserts a chunk, replacing any chunk already at its position.
    ///
    /// # Returns
    /// The position of a chunk evicted to stay within capacity, if any.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Option<Point2<i32>> {
        let position = chunk.position;
        match self.chunks.push(position, MtResource::new(chunk)) {
            Some((evicted, _)) if evicted != position => {
                log::warn!(
                    "Evicted chunk ({}, {}) to stay within {} loaded chunks",
                    evicted.x,
                    evicted.y,
                    self.chunks.cap()
                );
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Positions of all loaded chunks, most recently used first.
    pub fn loaded_positions(&self) -> Vec<Point2<i32>> {
        self.chunks.iter().map(|(position, _)| *position).collect()
    }

    /// Snapshots the boundary planes of the loaded neighbors of `position`.
    ///
    /// Each neighbor is read-locked only while its plane is copied.
    pub fn neighborhood(&self, position: Point2<i32>) -> ChunkNeighborhood {
        let mut neighborhood = ChunkNeighborhood::new();
        for side in ChunkNeighborhood::HORIZONTAL_SIDES {
            let neighbor = Self::neighbor_position(position, side)
                .and_then(|neighbor_position| self.get_chunk(neighbor_position));
            if let Some(neighbor) = neighbor {
                neighborhood.insert(side, &neighbor.get());
            }
        }
        neighborhood
    }

    /// Reads a block at world coordinates.
    ///
    /// # Returns
    /// `None` when the owning chunk is not loaded or `y` is outside the world.
    pub fn get_block_world(&self, world_x: i32, y: i32, world_z: i32) -> Option<BlockType> {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return None;
        }
        let chunk = self.get_chunk(Self::chunk_position_for(world_x, world_z))?;
        let (x, z) = Chunk::world_to_local(world_x, world_z);
        let block = chunk.get().get_block(x, y as usize, z);
        Some(block)
    }

    /// Writes a block at world coordinates.
    ///
    /// The owning chunk is marked dirty, and so is any loaded neighbor sharing the
    /// boundary the block sits on, since its culled edge faces may now be wrong.
    ///
    /// # Returns
    /// The positions of every chunk that became dirty; empty when the owning chunk
    /// is not loaded or `y` is outside the world.
    pub fn set_block_world(
        &self,
        world_x: i32,
        y: i32,
        world_z: i32,
        block: BlockType,
    ) -> Vec<Point2<i32>> {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return Vec::new();
        }
        let position = Self::chunk_position_for(world_x, world_z);
        let Some(chunk) = self.get_chunk(position) else {
            log::warn!(
                "Ignoring block write at ({world_x}, {y}, {world_z}): chunk ({}, {}) is not loaded",
                position.x,
                position.y
            );
            return Vec::new();
        };
        let (x, z) = Chunk::world_to_local(world_x, world_z);
        chunk.get_mut().set_block(x, y as usize, z, block);

        let mut dirtied = vec![position];
        let mut touched_sides = Vec::new();
        if x == 0 {
            touched_sides.push(BlockSide::LEFT);
        }
        if x == CHUNK_WIDTH - 1 {
            touched_sides.push(BlockSide::RIGHT);
        }
        if z == 0 {
            touched_sides.push(BlockSide::BACK);
        }
        if z == CHUNK_DEPTH - 1 {
            touched_sides.push(BlockSide::FRONT);
        }
        for side in touched_sides {
            let neighbor_position = Self::neighbor_position(position, side);
            if let Some((neighbor_position, neighbor)) = neighbor_position
                .and_then(|p| self.get_chunk(p).map(|neighbor| (p, neighbor)))
            {
                neighbor.get_mut().mark_dirty();
                dirtied.push(neighbor_position);
            }
        }
        dirtied
    }

    /// The topmost solid block height of a world column, if its chunk is loaded.
    pub fn height_at_world(&self, world_x: i32, world_z: i32) -> Option<f32> {
        let chunk = self.get_chunk(Self::chunk_position_for(world_x, world_z))?;
        let height = chunk.get().height_at(world_x, world_z);
        Some(height)
    }
}
