//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, conversion, and transparency checks.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive allows conversion from the compact
/// [`BlockTypeSize`] representation back into the rich enum.
///
/// Terrain generation only ever writes `STONE` and `AIR`; the remaining
/// variants exist so that game logic can place them.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. The only transparent block type.
    #[default]
    AIR = 0,

    /// A grass-topped block.
    GRASS = 1,

    /// A basic dirt block.
    DIRT = 2,

    /// Solid rock; the material produced by terrain generation.
    STONE = 3,

    /// A sand block.
    SAND = 4,

    /// A water block. Rendered like any other solid for face culling purposes.
    WATER = 5,
}

impl BlockType {
    /// Every block type, in discriminant order.
    pub const ALL: [BlockType; 6] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::SAND,
        BlockType::WATER,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` if the value names no variant.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(btype)
    }

    /// Returns the compact integer representation of this block type.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether faces adjacent to this block should be drawn.
    pub fn is_transparent(self) -> bool {
        self == BlockType::AIR
    }

    /// Inverse of [`BlockType::is_transparent`].
    pub fn is_solid(self) -> bool {
        !self.is_transparent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_the_default_and_only_transparent_type() {
        assert_eq!(BlockType::default(), BlockType::AIR);
        assert_eq!(BlockType::AIR.as_int(), 0);

        let transparent: Vec<_> = BlockType::ALL
            .into_iter()
            .filter(|b| b.is_transparent())
            .collect();
        assert_eq!(transparent, vec![BlockType::AIR]);
    }

    #[test]
    fn integer_conversion_covers_every_variant() {
        for block in BlockType::ALL {
            assert_eq!(BlockType::from_int(block.as_int()), Some(block));
        }
        assert_eq!(BlockType::from_int(6), None);
        assert_eq!(BlockType::from_int(BlockTypeSize::MAX), None);
    }
}
