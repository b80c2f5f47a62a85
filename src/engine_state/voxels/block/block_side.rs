//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the
//! static geometry used to emit them: the neighbor offset each face looks at,
//! its outward normal, and the corners of its quad on the unit cube.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value used to index the
/// static face tables below.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// Corners of the unit cube: the `z = 0` ring first, then the `z = 1` ring,
/// each wound counter-clockwise when seen from positive Z.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Two counter-clockwise triangles per face, as indices into [`CUBE_CORNERS`].
///
/// Each row is the quad `[a, b, c, d]` fanned into `(a, b, c)` and `(a, c, d)`.
pub const FACE_TRIANGLES: [[usize; 6]; 6] = [
    [4, 5, 6, 4, 6, 7], // FRONT
    [1, 0, 3, 1, 3, 2], // BACK
    [0, 1, 5, 0, 5, 4], // BOTTOM
    [3, 7, 6, 3, 6, 2], // TOP
    [0, 4, 7, 0, 7, 3], // LEFT
    [1, 2, 6, 1, 6, 5], // RIGHT
];

const FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, -1.0, 0.0],
    [0.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
];

const FACE_OFFSETS: [[i32; 3]; 6] = [
    [0, 0, 1],
    [0, 0, -1],
    [0, -1, 0],
    [0, 1, 0],
    [-1, 0, 0],
    [1, 0, 0],
];

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// This is useful for iterating over all possible faces of a block.
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    ///
    /// # Returns
    /// An array containing all `BlockSide` variants.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The face on the other side of the shared boundary.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// The step from a block to the neighbor that covers this face.
    pub fn offset(self) -> Vector3<i32> {
        FACE_OFFSETS[self as usize].into()
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        FACE_NORMALS[self as usize].into()
    }

    /// The six corner positions of this face's two triangles on the unit cube.
    pub fn triangle_corners(self) -> [[f32; 3]; 6] {
        FACE_TRIANGLES[self as usize].map(|corner| CUBE_CORNERS[corner])
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn normals_match_neighbor_offsets() {
        for side in BlockSide::all() {
            assert_eq!(side.normal(), side.offset().cast::<f32>().unwrap());
            assert_eq!(side.opposite().offset(), -side.offset());
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for side in BlockSide::all() {
            let corners = side.triangle_corners().map(Vector3::from);
            for triangle in corners.chunks(3) {
                let cross = (triangle[1] - triangle[0]).cross(triangle[2] - triangle[0]);
                assert!(
                    (cross.normalize() - side.normal()).magnitude() < 1e-6,
                    "{side:?} triangle faces {cross:?}"
                );
            }
        }
    }

    #[test]
    fn faces_lie_on_the_matching_cube_plane() {
        for side in BlockSide::all() {
            let normal = side.normal();
            // Corners on a positive face sit at 1 along the axis, on a negative face at 0.
            let expected = if normal.x + normal.y + normal.z > 0.0 { 1.0 } else { 0.0 };
            for corner in side.triangle_corners() {
                let along = Vector3::from(corner).dot(normal.map(f32::abs));
                assert_eq!(along, expected, "{side:?}");
            }
        }
    }
}
