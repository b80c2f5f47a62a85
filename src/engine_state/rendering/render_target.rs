//! # Render Handoff
//!
//! The boundary between the chunk engine and whatever draws its meshes.
//!
//! Completed meshing work is turned into [`RenderCommand`]s on the owning thread
//! and submitted to a [`RenderTarget`]. A real renderer uploads the bytes into a
//! GPU-visible buffer and issues a triangle-list draw of `vertex_count` vertices;
//! [`DrawList`] is an in-memory target that keeps the same bookkeeping.
//!
//! An empty mesh is a valid, drawable state: it is uploaded like any other and
//! simply produces no draw call.

use std::collections::HashMap;

use cgmath::Point2;

use super::meshing::ChunkMesh;

/// Work for a renderer, produced when a chunk's mesh changes or the chunk leaves the world.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Replace the buffers of the chunk at `position`.
    Upload {
        /// Chunk coordinates.
        position: Point2<i32>,
        /// `f32` position triplets as raw bytes.
        positions: Vec<u8>,
        /// `f32` normal triplets as raw bytes.
        normals: Vec<u8>,
        /// Number of vertices in the triangle list.
        vertex_count: usize,
    },
    /// Release the buffers of the chunk at `position`.
    Remove {
        /// Chunk coordinates.
        position: Point2<i32>,
    },
}

impl RenderCommand {
    /// Builds an upload command from a mesh.
    pub fn upload(position: Point2<i32>, mesh: &ChunkMesh) -> Self {
        RenderCommand::Upload {
            position,
            positions: mesh.position_bytes().to_vec(),
            normals: mesh.normal_bytes().to_vec(),
            vertex_count: mesh.vertex_count(),
        }
    }

    /// The chunk this command concerns.
    pub fn position(&self) -> Point2<i32> {
        match self {
            RenderCommand::Upload { position, .. } | RenderCommand::Remove { position } => {
                *position
            }
        }
    }
}

/// Consumer of [`RenderCommand`]s.
pub trait RenderTarget {
    /// Applies one command.
    fn submit(&mut self, command: RenderCommand);
}

/// Buffers held for one uploaded chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedMesh {
    /// Raw position bytes.
    pub positions: Vec<u8>,
    /// Raw normal bytes.
    pub normals: Vec<u8>,
    /// Number of vertices to draw.
    pub vertex_count: usize,
    /// How many times this chunk has been uploaded.
    pub uploads: usize,
}

/// A [`RenderTarget`] that records uploads and reports the draw calls a frame would issue.
#[derive(Debug, Default)]
pub struct DrawList {
    meshes: HashMap<Point2<i32>, UploadedMesh>,
}

impl DrawList {
    /// Creates an empty draw list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffers uploaded for a chunk.
    pub fn mesh(&self, position: Point2<i32>) -> Option<&UploadedMesh> {
        self.meshes.get(&position)
    }

    /// Number of chunks with uploaded buffers, including empty ones.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether nothing has been uploaded.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// One `(chunk, vertex_count)` per chunk with something to draw, sorted by position.
    ///
    /// Chunks whose mesh is empty are skipped rather than drawn with zero vertices.
    pub fn draw_calls(&self) -> Vec<(Point2<i32>, usize)> {
        let mut calls: Vec<_> = self
            .meshes
            .iter()
            .filter(|(_, mesh)| mesh.vertex_count > 0)
            .map(|(position, mesh)| (*position, mesh.vertex_count))
            .collect();
        calls.sort_by_key(|(position, _)| (position.x, position.y));
        calls
    }

    /// Total vertices across all draw calls.
    pub fn total_vertices(&self) -> usize {
        self.meshes.values().map(|mesh| mesh.vertex_count).sum()
    }
}

impl RenderTarget for DrawList {
    fn submit(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Upload {
                position,
                positions,
                normals,
                vertex_count,
            } => {
                debug_assert_eq!(positions.len(), normals.len());
                let entry = self.meshes.entry(position).or_default();
                entry.positions = positions;
                entry.normals = normals;
                entry.vertex_count = vertex_count;
                entry.uploads += 1;
            }
            RenderCommand::Remove { position } => {
                self.meshes.remove(&position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

    #[test]
    fn upload_carries_the_mesh_bytes() {
        let mut chunk = Chunk::empty(0, 0);
        chunk.set_block(0, 0, 0, BlockType::STONE);
        chunk.update();

        let command = RenderCommand::upload(chunk.position, chunk.mesh());
        let RenderCommand::Upload {
            positions,
            normals,
            vertex_count,
            ..
        } = &command
        else {
            panic!("expected an upload");
        };
        assert_eq!(*vertex_count, 36);
        assert_eq!(positions.len(), 36 * 3 * std::mem::size_of::<f32>());
        assert_eq!(normals.len(), positions.len());
        let floats: Vec<f32> = positions
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(floats, chunk.mesh().positions);
    }

    #[test]
    fn empty_meshes_are_kept_but_not_drawn() {
        let mut draw_list = DrawList::new();
        let empty = Chunk::empty(1, 1);
        draw_list.submit(RenderCommand::upload(empty.position, empty.mesh()));

        let mut solid = Chunk::empty(0, 0);
        solid.set_block(3, 3, 3, BlockType::STONE);
        solid.update();
        draw_list.submit(RenderCommand::upload(solid.position, solid.mesh()));
        draw_list.submit(RenderCommand::upload(solid.position, solid.mesh()));

        assert_eq!(draw_list.len(), 2);
        assert_eq!(draw_list.draw_calls(), vec![(Point2::new(0, 0), 36)]);
        assert_eq!(draw_list.mesh(Point2::new(0, 0)).unwrap().uploads, 2);
        assert_eq!(draw_list.mesh(Point2::new(1, 1)).unwrap().vertex_count, 0);
    }

    #[test]
    fn remove_drops_the_chunk() {
        let mut draw_list = DrawList::new();
        let chunk = Chunk::new(0, 0);
        draw_list.submit(RenderCommand::upload(chunk.position, chunk.mesh()));
        draw_list.submit(RenderCommand::Remove {
            position: chunk.position,
        });
        assert!(draw_list.is_empty());
        assert!(draw_list.draw_calls().is_empty());
    }
}
