//! # Face-Culling Mesher
//!
//! Converts a [`BlockGrid`] into a [`ChunkMesh`] by emitting only the cube faces
//! that can be seen.
//!
//! ## Algorithm
//!
//! Every cell is visited in a fixed order (x outer, y middle, z inner). Air cells
//! are skipped. For each solid cell, each of the six faces is emitted when the
//! neighbor across that face is transparent. A neighbor inside the grid is
//! transparent when it is air; a neighbor outside the grid is resolved by the
//! [`NeighborProvider`] passed in.
//!
//! Output size is proportional to the exposed surface, not the solid volume, and
//! identical grids always produce byte-identical buffers.

mod mesh;

use log::debug;

use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::block_grid::BlockGrid};

pub use mesh::ChunkMesh;

/// Answers solidity queries for cells beyond a grid's edge.
///
/// Coordinates are in the local space of the grid being meshed, so at least one
/// component lies outside `[0, extent)`.
pub trait NeighborProvider {
    /// Whether the out-of-grid cell at local `(x, y, z)` hides the face pointing at it.
    fn is_solid_outside(&self, x: i32, y: i32, z: i32) -> bool;
}

/// Treats everything beyond the grid as air, so chunk edges always render.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenBoundary;

impl NeighborProvider for OpenBoundary {
    fn is_solid_outside(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
}

/// Whether the face of cell `(x, y, z)` on `side` should be drawn.
///
/// Only meaningful for solid cells.
pub fn is_face_exposed<const W: usize, const H: usize, const D: usize, N>(
    grid: &BlockGrid<W, H, D>,
    neighbors: &N,
    x: i32,
    y: i32,
    z: i32,
    side: BlockSide,
) -> bool
where
    N: NeighborProvider + ?Sized,
{
    let offset = side.offset();
    let (nx, ny, nz) = (x + offset.x, y + offset.y, z + offset.z);
    match grid.get_signed(nx, ny, nz) {
        Some(block) => block.is_transparent(),
        None => !neighbors.is_solid_outside(nx, ny, nz),
    }
}

/// Builds the visible-face mesh of a grid.
///
/// # Arguments
/// * `grid` - The blocks to mesh
/// * `neighbors` - Resolves cells beyond the grid edge; use [`OpenBoundary`] to render every edge
///
/// # Returns
/// A triangle list with six vertices per exposed face. An all-air or fully enclosed
/// grid yields an empty mesh.
pub fn build_mesh<const W: usize, const H: usize, const D: usize, N>(
    grid: &BlockGrid<W, H, D>,
    neighbors: &N,
) -> ChunkMesh
where
    N: NeighborProvider + ?Sized,
{
    let mut mesh = ChunkMesh::new();

    for x in 0..W {
        for y in 0..H {
            for z in 0..D {
                if grid.get(x, y, z).is_transparent() {
                    continue;
                }
                let (xi, yi, zi) = (x as i32, y as i32, z as i32);
                for side in BlockSide::all() {
                    if is_face_exposed(grid, neighbors, xi, yi, zi, side) {
                        emit_face(&mut mesh, x, y, z, side);
                    }
                }
            }
        }
    }

    debug!(
        "Meshed {}x{}x{} grid: {} faces, {} vertices",
        W,
        H,
        D,
        mesh.face_count(),
        mesh.vertex_count()
    );

    mesh
}

fn emit_face(mesh: &mut ChunkMesh, x: usize, y: usize, z: usize, side: BlockSide) {
    let normal = side.normal();
    let origin = [x as f32, y as f32, z as f32];
    for corner in side.triangle_corners() {
        mesh.push_vertex(
            [
                origin[0] + corner[0],
                origin[1] + corner[1],
                origin[2] + corner[2],
            ],
            normal,
        );
    }
}
