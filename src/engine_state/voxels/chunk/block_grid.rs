//! # Block Grid Module
//!
//! A dense, fixed-extent 3D array of [`BlockType`] cells.
//!
//! ## Memory Layout
//!
//! Cells are stored in a single flat allocation. A cell at local coordinates
//! `(x, y, z)` lives at `y * D * W + z * W + x`, so a horizontal `y` slice is
//! contiguous and `x` is the fastest-moving axis.

use cgmath::Point3;

use crate::{engine_state::voxels::block::block_type::BlockType, error::ChunkError};

/// A `W × H × D` grid of blocks with compile-time extents.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockGrid<const W: usize, const H: usize, const D: usize> {
    blocks: Box<[BlockType]>,
}

impl<const W: usize, const H: usize, const D: usize> BlockGrid<W, H, D> {
    /// Extent along X.
    pub const WIDTH: usize = W;
    /// Extent along Y.
    pub const HEIGHT: usize = H;
    /// Extent along Z.
    pub const DEPTH: usize = D;
    /// Total number of cells.
    pub const VOLUME: usize = W * H * D;

    /// Creates a grid filled with air.
    pub fn new() -> Self {
        Self::filled(BlockType::AIR)
    }

    /// Creates a grid with every cell set to `block`.
    pub fn filled(block: BlockType) -> Self {
        BlockGrid {
            blocks: vec![block; Self::VOLUME].into_boxed_slice(),
        }
    }

    /// Whether signed local coordinates fall inside the grid.
    pub fn contains(x: i32, y: i32, z: i32) -> bool {
        (0..W as i32).contains(&x) && (0..H as i32).contains(&y) && (0..D as i32).contains(&z)
    }

    /// Maps in-range local coordinates to their linear slot.
    ///
    /// # Panics
    /// Debug builds panic when the coordinates are outside the grid.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < W && y < H && z < D, "({x}, {y}, {z}) outside {W}x{H}x{D} grid");
        y * D * W + z * W + x
    }

    /// Inverse of [`BlockGrid::index`].
    pub fn position_of(index: usize) -> Point3<usize> {
        let x = index % W;
        let z = (index / W) % D;
        let y = index / (W * D);
        Point3::new(x, y, z)
    }

    fn checked_index(x: usize, y: usize, z: usize) -> Result<usize, ChunkError> {
        if x < W && y < H && z < D {
            Ok(Self::index(x, y, z))
        } else {
            Err(ChunkError::OutOfBounds { x, y, z })
        }
    }

    /// Reads a cell, rejecting out-of-range coordinates.
    pub fn try_get(&self, x: usize, y: usize, z: usize) -> Result<BlockType, ChunkError> {
        Self::checked_index(x, y, z).map(|index| self.blocks[index])
    }

    /// Writes a cell, rejecting out-of-range coordinates.
    pub fn try_set(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: BlockType,
    ) -> Result<(), ChunkError> {
        let index = Self::checked_index(x, y, z)?;
        self.blocks[index] = block;
        Ok(())
    }

    /// Reads a cell.
    ///
    /// # Panics
    /// Panics when the coordinates are outside the grid.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        match self.try_get(x, y, z) {
            Ok(block) => block,
            Err(err) => panic!("{err}"),
        }
    }

    /// Writes a cell.
    ///
    /// # Panics
    /// Panics when the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        if let Err(err) = self.try_set(x, y, z, block) {
            panic!("{err}");
        }
    }

    /// Looks up a cell with signed coordinates, returning `None` outside the grid.
    ///
    /// This is the neighbor query used by meshing, where stepping off the edge is expected.
    #[inline]
    pub fn get_signed(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        if Self::contains(x, y, z) {
            Some(self.blocks[Self::index(x as usize, y as usize, z as usize)])
        } else {
            None
        }
    }

    /// Fills `y in [0, height)` of a column with `block` and the rest with air.
    pub fn fill_column(&mut self, x: usize, z: usize, height: usize, block: BlockType) {
        for y in 0..H {
            let value = if y < height { block } else { BlockType::AIR };
            self.set(x, y, z, value);
        }
    }

    /// The y of the highest non-air cell in a column.
    pub fn top_solid(&self, x: usize, z: usize) -> Option<usize> {
        (0..H).rev().find(|&y| self.get(x, y, z).is_solid())
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_solid()).count()
    }

    /// Raw cells in linear-index order.
    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks
    }
}

impl<const W: usize, const H: usize, const D: usize> Default for BlockGrid<W, H, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize, const D: usize> std::fmt::Debug for BlockGrid<W, H, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockGrid")
            .field("extents", &(W, H, D))
            .field("solid", &self.solid_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type SmallGrid = BlockGrid<3, 4, 5>;

    #[test]
    fn index_is_bijective_over_the_grid() {
        let mut seen = vec![false; SmallGrid::VOLUME];
        for y in 0..4 {
            for z in 0..5 {
                for x in 0..3 {
                    let index = SmallGrid::index(x, y, z);
                    assert!(!seen[index], "slot {index} hit twice");
                    seen[index] = true;
                    assert_eq!(SmallGrid::position_of(index), Point3::new(x, y, z));
                }
            }
        }
        assert!(seen.into_iter().all(|hit| hit));
    }

    #[test]
    fn index_follows_y_then_z_then_x_layout() {
        assert_eq!(SmallGrid::index(1, 0, 0), 1);
        assert_eq!(SmallGrid::index(0, 0, 1), 3);
        assert_eq!(SmallGrid::index(0, 1, 0), 15);
        assert_eq!(SmallGrid::index(2, 3, 4), 3 * 15 + 4 * 3 + 2);
    }

    #[test]
    fn out_of_range_access_is_an_error_not_a_wrap() {
        let mut grid = SmallGrid::new();
        assert_eq!(
            grid.try_get(3, 0, 0),
            Err(ChunkError::OutOfBounds { x: 3, y: 0, z: 0 })
        );
        assert!(grid.try_set(0, 4, 0, BlockType::STONE).is_err());
        assert_eq!(grid.solid_count(), 0);
        assert_eq!(grid.get_signed(-1, 0, 0), None);
        assert_eq!(grid.get_signed(0, 0, 5), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn plain_get_fails_fast() {
        SmallGrid::new().get(0, 0, 5);
    }

    #[test]
    fn fill_column_and_top_solid() {
        let mut grid = SmallGrid::new();
        assert_eq!(grid.top_solid(1, 1), None);

        grid.fill_column(1, 1, 3, BlockType::STONE);
        assert_eq!(grid.top_solid(1, 1), Some(2));
        assert_eq!(grid.get(1, 3, 1), BlockType::AIR);
        assert_eq!(grid.solid_count(), 3);

        grid.fill_column(1, 1, 1, BlockType::STONE);
        assert_eq!(grid.top_solid(1, 1), Some(0));
        assert_eq!(grid.solid_count(), 1);
    }
}
