//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a `16 × 64 × 16` column of blocks
//! together with the mesh built from it.
//!
//! ## Lifecycle
//!
//! 1. Construction fills the grid from the height field and builds the first mesh
//! 2. `set_block` mutates the grid and marks the chunk dirty
//! 3. `update` rebuilds the mesh only if the chunk is dirty, so any number of
//!    edits between two updates cost a single rebuild
//!
//! While the chunk is clean its mesh always matches its grid.
//!
//! Every mutation also bumps a revision counter. A worker that meshes against a
//! snapshot of its neighbors records the revision first and passes it to
//! [`Chunk::update_from_snapshot`], so a change that lands while the snapshot is
//! being taken leaves the chunk dirty instead of being lost.

use cgmath::Point2;
use log::debug;

use crate::{
    engine_state::{
        rendering::meshing::{build_mesh, ChunkMesh, NeighborProvider, OpenBoundary},
        voxels::{block::block_type::BlockType, height_field::HeightField},
    },
    error::ChunkError,
};

use block_grid::BlockGrid;

pub mod block_grid;
pub mod neighborhood;

/// Extent of a chunk along X, in blocks.
pub const CHUNK_WIDTH: usize = 16;
/// Extent of a chunk along Y, in blocks.
pub const CHUNK_HEIGHT: usize = 64;
/// Extent of a chunk along Z, in blocks.
pub const CHUNK_DEPTH: usize = 16;

/// The block storage of a full-size chunk.
pub type ChunkGrid = BlockGrid<CHUNK_WIDTH, CHUNK_HEIGHT, CHUNK_DEPTH>;

/// A column of terrain and its renderable mesh.
///
/// Chunks are addressed by integer chunk coordinates `(x, z)`; the chunk covers
/// world columns `[x * CHUNK_WIDTH, (x + 1) * CHUNK_WIDTH) × [z * CHUNK_DEPTH, (z + 1) * CHUNK_DEPTH)`
/// and the full height of the world.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point2<i32>,
    grid: ChunkGrid,
    dirty: bool,
    revision: u64,
    mesh: ChunkMesh,
}

impl Chunk {
    /// Creates, generates and meshes the chunk at `(chunk_x, chunk_z)` with the
    /// default terrain parameters.
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self::with_height_field(chunk_x, chunk_z, &HeightField::default())
    }

    /// Creates, generates and meshes a chunk using a shared height field.
    ///
    /// # Arguments
    /// * `chunk_x`, `chunk_z` - The chunk coordinates
    /// * `height_field` - Terrain heights, typically shared by every chunk of a world
    pub fn with_height_field(chunk_x: i32, chunk_z: i32, height_field: &HeightField) -> Self {
        let mut chunk = Self::empty(chunk_x, chunk_z);
        chunk.generate_terrain(height_field);
        chunk.update();
        chunk
    }

    /// Creates an all-air chunk with an (empty, and therefore current) mesh.
    pub fn empty(chunk_x: i32, chunk_z: i32) -> Self {
        Chunk {
            position: Point2::new(chunk_x, chunk_z),
            grid: ChunkGrid::new(),
            dirty: false,
            revision: 0,
            mesh: ChunkMesh::new(),
        }
    }

    /// Refills every column from the height field: stone below the terrain
    /// height, air above. Marks the chunk dirty.
    pub fn generate_terrain(&mut self, height_field: &HeightField) {
        let (origin_x, origin_z) = self.chunk_pos_world();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let world_x = f64::from(origin_x + x as i32);
                let world_z = f64::from(origin_z + z as i32);
                let height = height_field.height_at(world_x, world_z);
                self.grid.fill_column(x, z, height as usize, BlockType::STONE);
            }
        }
        self.mark_dirty();

        debug!(
            "Generated chunk ({}, {}) with {} solid blocks",
            self.position.x,
            self.position.y,
            self.grid.solid_count()
        );
    }

    /// Reads a block by local coordinates.
    ///
    /// # Panics
    /// Panics when the coordinates are outside the chunk. Use
    /// [`Chunk::try_get_block`] for a checked read.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.grid.get(x, y, z)
    }

    /// Writes a block by local coordinates and marks the chunk dirty.
    ///
    /// # Panics
    /// Panics when the coordinates are outside the chunk. Use
    /// [`Chunk::try_set_block`] for a checked write.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        self.grid.set(x, y, z, block);
        self.mark_dirty();
    }

    /// Checked variant of [`Chunk::get_block`].
    pub fn try_get_block(&self, x: usize, y: usize, z: usize) -> Result<BlockType, ChunkError> {
        self.grid.try_get(x, y, z)
    }

    /// Checked variant of [`Chunk::set_block`]. The chunk is left untouched on error.
    pub fn try_set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: BlockType,
    ) -> Result<(), ChunkError> {
        self.grid.try_set(x, y, z, block)?;
        self.mark_dirty();
        Ok(())
    }

    /// Rebuilds the mesh if dirty, treating every chunk edge as exposed.
    ///
    /// # Returns
    /// `true` if a rebuild happened.
    pub fn update(&mut self) -> bool {
        self.update_with_neighbors(&OpenBoundary)
    }

    /// Rebuilds the mesh if dirty, culling edge faces against `neighbors`.
    ///
    /// # Returns
    /// `true` if a rebuild happened.
    pub fn update_with_neighbors<N>(&mut self, neighbors: &N) -> bool
    where
        N: NeighborProvider + ?Sized,
    {
        self.update_from_snapshot(neighbors, self.revision)
    }

    /// Rebuilds the mesh if dirty, against neighbors captured when the chunk was at
    /// `revision`.
    ///
    /// The chunk only becomes clean if nothing has changed since `revision`;
    /// otherwise the new mesh is kept but the chunk stays dirty for the next rebuild.
    ///
    /// # Returns
    /// `true` if a rebuild happened.
    pub fn update_from_snapshot<N>(&mut self, neighbors: &N, revision: u64) -> bool
    where
        N: NeighborProvider + ?Sized,
    {
        if !self.dirty {
            return false;
        }
        self.mesh = build_mesh(&self.grid, neighbors);
        self.dirty = self.revision != revision;
        true
    }

    /// Whether the mesh is stale relative to the grid.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next update to rebuild, e.g. after a neighboring chunk changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Counter bumped by every mutation and every [`Chunk::mark_dirty`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The mesh from the last rebuild.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// The block storage.
    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Chunk-space coordinates `(chunk_x, chunk_z)`.
    pub fn chunk_pos_chunk(&self) -> (i32, i32) {
        (self.position.x, self.position.y)
    }

    /// World-space origin `(chunk_x * CHUNK_WIDTH, chunk_z * CHUNK_DEPTH)`.
    pub fn chunk_pos_world(&self) -> (i32, i32) {
        (
            self.position.x * CHUNK_WIDTH as i32,
            self.position.y * CHUNK_DEPTH as i32,
        )
    }

    /// Whether a world column lies inside this chunk.
    pub fn in_chunk(&self, world_x: i32, world_z: i32) -> bool {
        let (origin_x, origin_z) = self.chunk_pos_world();
        (origin_x..origin_x + CHUNK_WIDTH as i32).contains(&world_x)
            && (origin_z..origin_z + CHUNK_DEPTH as i32).contains(&world_z)
    }

    /// Converts a world column to local `(x, z)` with Euclidean modulo, so the
    /// result is in range for negative coordinates too.
    pub fn world_to_local(world_x: i32, world_z: i32) -> (usize, usize) {
        (
            world_x.rem_euclid(CHUNK_WIDTH as i32) as usize,
            world_z.rem_euclid(CHUNK_DEPTH as i32) as usize,
        )
    }

    /// The y of the topmost solid block in the column containing a world position,
    /// or `0.0` if the column is all air.
    ///
    /// The column is found by wrapping the world coordinate into the chunk, so the
    /// caller should check [`Chunk::in_chunk`] first.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> f32 {
        let (x, z) = Self::world_to_local(world_x, world_z);
        self.grid.top_solid(x, z).map_or(0.0, |y| y as f32)
    }
}
