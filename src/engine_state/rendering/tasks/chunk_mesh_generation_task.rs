//! Task for rebuilding a chunk's mesh on a worker thread.
//!
//! The task records the chunk's revision, snapshots the boundary planes of its
//! loaded neighbors, then rebuilds the chunk under its write lock if it is dirty.
//! The chunk lock is never held while neighbors are read. A neighbor that changes
//! after the snapshot bumps the chunk's revision, which keeps the chunk dirty until
//! the follow-up task rebuilds it.
//!
//! The upload is built on the owning thread from the chunk's current mesh, and only
//! while the chunk is loaded and clean, so a stale rebuild never reaches the renderer.

use cgmath::Point2;
use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::render_target::RenderCommand,
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::{
            chunk::{neighborhood::ChunkNeighborhood, Chunk},
            world::World,
        },
    },
};

/// A task that rebuilds the mesh of one chunk if it is dirty.
pub struct ChunkMeshGenerationTask {
    /// The world holding the chunk and its neighbors
    world: MtResource<World>,
    /// Chunk coordinates of the chunk to mesh
    position: Point2<i32>,
}

/// What a mesh task reads before it locks the chunk for writing.
struct MeshSnapshot {
    chunk: MtResource<Chunk>,
    revision: u64,
    neighborhood: ChunkNeighborhood,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `world` - Thread-safe reference to the world
    /// * `position` - Chunk coordinates of the chunk to mesh
    pub fn new(world: MtResource<World>, position: Point2<i32>) -> Self {
        ChunkMeshGenerationTask { world, position }
    }

    /// Reads the chunk's revision, then its neighbors, under the world read lock.
    fn snapshot(&self) -> Option<MeshSnapshot> {
        let world = self.world.get();
        let chunk = world.get_chunk(self.position)?;
        let revision = chunk.get().revision();
        let neighborhood = world.neighborhood(self.position);
        Some(MeshSnapshot {
            chunk,
            revision,
            neighborhood,
        })
    }

    /// Rebuilds against a snapshot. Returns whether a rebuild happened.
    fn rebuild(snapshot: &MeshSnapshot) -> bool {
        snapshot
            .chunk
            .get_mut()
            .update_from_snapshot(&snapshot.neighborhood, snapshot.revision)
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Rebuilds the mesh if the chunk is loaded and dirty.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let rebuilt = match self.snapshot() {
            Some(snapshot) => Self::rebuild(&snapshot),
            None => {
                debug!(
                    "Skipping mesh for unloaded chunk ({}, {})",
                    self.position.x, self.position.y
                );
                false
            }
        };

        Box::new(ChunkMeshGenerationTaskResult {
            position: self.position,
            rebuilt,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    /// Chunk coordinates of the meshed chunk
    position: Point2<i32>,
    /// Whether the task rebuilt the mesh
    rebuilt: bool,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Uploads the chunk's current mesh if the task rebuilt it and it is still
    /// loaded and clean.
    ///
    /// A chunk that went dirty again has a follow-up task queued, which uploads
    /// once it settles.
    fn handle_result(
        self: Box<Self>,
        context: &TaskContext,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>) {
        if !self.rebuilt {
            return (Vec::new(), Vec::new());
        }
        let Some(chunk) = context.world.get().get_chunk(self.position) else {
            return (Vec::new(), Vec::new());
        };
        let chunk = chunk.get();
        if chunk.is_dirty() {
            return (Vec::new(), Vec::new());
        }
        (
            Vec::new(),
            vec![RenderCommand::upload(self.position, chunk.mesh())],
        )
    }
}
