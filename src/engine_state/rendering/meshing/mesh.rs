//! Mesh buffers handed from a chunk to the renderer.

use cgmath::Vector3;

/// An indexless triangle list: every three consecutive vertices form one triangle.
///
/// `positions` and `normals` are flat `f32` triplets of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex positions in chunk-local space, `[x0, y0, z0, x1, ...]`.
    pub positions: Vec<f32>,
    /// Per-vertex normals, parallel to `positions`.
    pub normals: Vec<f32>,
}

impl ChunkMesh {
    /// Floats per vertex in each buffer.
    pub const COMPONENTS: usize = 3;
    /// Vertices emitted for one cube face (two triangles).
    pub const VERTICES_PER_FACE: usize = 6;

    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one vertex.
    pub fn push_vertex(&mut self, position: [f32; 3], normal: Vector3<f32>) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
    }

    /// Number of vertices the renderer should draw.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / Self::COMPONENTS
    }

    /// Number of triangles in the list.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Number of cube faces in the list.
    pub fn face_count(&self) -> usize {
        self.vertex_count() / Self::VERTICES_PER_FACE
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position buffer as raw bytes, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal buffer as raw bytes, ready for upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Iterates `(position, normal)` pairs.
    pub fn vertices(&self) -> impl Iterator<Item = ([f32; 3], [f32; 3])> + '_ {
        self.positions
            .chunks_exact(Self::COMPONENTS)
            .zip(self.normals.chunks_exact(Self::COMPONENTS))
            .map(|(p, n)| ([p[0], p[1], p[2]], [n[0], n[1], n[2]]))
    }
}
