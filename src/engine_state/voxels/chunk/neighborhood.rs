//! # Chunk Neighborhood Module
//!
//! Read-only snapshots of the boundary planes of a chunk's four horizontal
//! neighbors, used to cull faces against real cross-chunk solidity.
//!
//! Snapshots are taken up front so that meshing never holds more than one chunk
//! lock at a time. Each plane is stored as a bit vector, one bit per cell.

use bitvec::prelude::BitVec;

use super::{Chunk, ChunkGrid, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::engine_state::{
    rendering::meshing::NeighborProvider, voxels::block::block_side::BlockSide,
};

/// Solidity of one vertical boundary plane of a chunk.
///
/// Bits are laid out row by row: `y * columns + u`, where `u` runs along X for
/// planes facing Z and along Z for planes facing X.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundarySlab {
    columns: usize,
    solid: BitVec,
}

impl BoundarySlab {
    /// Captures the plane of `grid` lying on `side`.
    ///
    /// # Returns
    /// `None` for `TOP` and `BOTTOM`, which have no horizontal neighbor.
    pub fn capture(grid: &ChunkGrid, side: BlockSide) -> Option<Self> {
        let columns = match side {
            BlockSide::FRONT | BlockSide::BACK => CHUNK_WIDTH,
            BlockSide::LEFT | BlockSide::RIGHT => CHUNK_DEPTH,
            BlockSide::TOP | BlockSide::BOTTOM => return None,
        };

        let mut solid = BitVec::with_capacity(columns * CHUNK_HEIGHT);
        for y in 0..CHUNK_HEIGHT {
            for u in 0..columns {
                let block = match side {
                    BlockSide::FRONT => grid.get(u, y, CHUNK_DEPTH - 1),
                    BlockSide::BACK => grid.get(u, y, 0),
                    BlockSide::LEFT => grid.get(0, y, u),
                    _ => grid.get(CHUNK_WIDTH - 1, y, u),
                };
                solid.push(block.is_solid());
            }
        }

        Some(BoundarySlab { columns, solid })
    }

    /// Whether the cell at height `y`, column `u` of the plane is solid.
    pub fn is_solid(&self, y: usize, u: usize) -> bool {
        u < self.columns && self.solid.get(y * self.columns + u).is_some_and(|bit| *bit)
    }

    /// Number of solid cells in the plane.
    pub fn solid_count(&self) -> usize {
        self.solid.count_ones()
    }
}

/// The boundary planes facing a chunk from each loaded horizontal neighbor.
///
/// Missing neighbors read as air, matching [`crate::engine_state::rendering::meshing::OpenBoundary`].
#[derive(Debug, Clone, Default)]
pub struct ChunkNeighborhood {
    slabs: [Option<BoundarySlab>; 4],
}

fn slot(side: BlockSide) -> Option<usize> {
    match side {
        BlockSide::FRONT => Some(0),
        BlockSide::BACK => Some(1),
        BlockSide::LEFT => Some(2),
        BlockSide::RIGHT => Some(3),
        BlockSide::TOP | BlockSide::BOTTOM => None,
    }
}

impl ChunkNeighborhood {
    /// The four sides that can have a neighboring chunk.
    pub const HORIZONTAL_SIDES: [BlockSide; 4] = [
        BlockSide::FRONT,
        BlockSide::BACK,
        BlockSide::LEFT,
        BlockSide::RIGHT,
    ];

    /// A neighborhood with no neighbors loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `neighbor`, which lies on `side` of the chunk being meshed.
    pub fn insert(&mut self, side: BlockSide, neighbor: &Chunk) {
        if let Some(index) = slot(side) {
            self.slabs[index] = BoundarySlab::capture(neighbor.grid(), side.opposite());
        }
    }

    /// The slab recorded for `side`, if any.
    pub fn slab(&self, side: BlockSide) -> Option<&BoundarySlab> {
        slot(side).and_then(|index| self.slabs[index].as_ref())
    }

    /// Number of neighbors recorded.
    pub fn len(&self) -> usize {
        self.slabs.iter().filter(|slab| slab.is_some()).count()
    }

    /// Whether no neighbor is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NeighborProvider for ChunkNeighborhood {
    fn is_solid_outside(&self, x: i32, y: i32, z: i32) -> bool {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return false;
        }
        let (side, u) = if x < 0 {
            (BlockSide::LEFT, z)
        } else if x >= CHUNK_WIDTH as i32 {
            (BlockSide::RIGHT, z)
        } else if z < 0 {
            (BlockSide::BACK, x)
        } else if z >= CHUNK_DEPTH as i32 {
            (BlockSide::FRONT, x)
        } else {
            return false;
        };
        if u < 0 {
            return false;
        }
        self.slab(side)
            .is_some_and(|slab| slab.is_solid(y as usize, u as usize))
    }
}
