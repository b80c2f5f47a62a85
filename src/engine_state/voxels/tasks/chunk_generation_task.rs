//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates chunk data on a
//! worker thread. It is scheduled when new chunks come into view.

use cgmath::Point2;
use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::{
            render_target::RenderCommand,
            tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        },
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::{
            chunk::{neighborhood::ChunkNeighborhood, Chunk},
            world::World,
        },
    },
};

/// A task that generates a chunk and adds it to the world.
///
/// This task is responsible for:
/// 1. Generating the chunk's terrain off the owning thread
/// 2. Adding the chunk to the world
/// 3. Scheduling mesh generation for the chunk and its loaded neighbors
pub struct ChunkGenerationTask {
    /// A thread-safe reference to the world where the chunk will be added
    world: MtResource<World>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point2<i32>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `world` - A thread-safe reference to the world
    /// * `position` - The chunk coordinates where the chunk should be generated
    pub fn new(world: MtResource<World>, position: Point2<i32>) -> Self {
        ChunkGenerationTask { world, position }
    }
}

impl Task for ChunkGenerationTask {
    /// Generates the chunk and inserts it into the world.
    ///
    /// The world lock is only held for the lookup and the insert; terrain
    /// generation itself runs unlocked so workers generate in parallel.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let height_field = {
            let world = self.world.get();
            if world.contains_chunk(self.position) {
                return Box::new(ChunkGenerationTaskResult {
                    position: self.position,
                    generated: false,
                    evicted: None,
                });
            }
            world.height_field()
        };

        let chunk = Chunk::with_height_field(self.position.x, self.position.y, &height_field);
        let evicted = self.world.get_mut().insert_chunk(chunk);

        Box::new(ChunkGenerationTaskResult {
            position: self.position,
            generated: true,
            evicted,
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// Where the chunk was generated
    position: Point2<i32>,
    /// Whether a new chunk was inserted; `false` if one was already loaded
    generated: bool,
    /// A chunk pushed out of the world to make room
    evicted: Option<Point2<i32>>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Schedules meshing for every chunk whose boundary just changed.
    ///
    /// That is the new chunk and its loaded neighbors, and the loaded neighbors of
    /// any evicted chunk, whose edges now face air. Each one is marked dirty first,
    /// so a mesh task already running against an older snapshot cannot leave it clean.
    fn handle_result(
        self: Box<Self>,
        context: &TaskContext,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>) {
        let mut render_commands = Vec::new();
        let mut to_mesh = Vec::new();

        if let Some(evicted) = self.evicted {
            debug!(
                "Chunk ({}, {}) evicted, remeshing its neighbors",
                evicted.x, evicted.y
            );
            render_commands.push(RenderCommand::Remove { position: evicted });
            to_mesh.extend(horizontal_neighbors(evicted));
        }

        if self.generated {
            debug!(
                "Generated chunk ({}, {}), scheduling meshing",
                self.position.x, self.position.y
            );
            to_mesh.push(self.position);
            to_mesh.extend(horizontal_neighbors(self.position));
        }

        let world = context.world.get();
        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
        let mut scheduled = Vec::with_capacity(to_mesh.len());
        for position in to_mesh {
            if scheduled.contains(&position) {
                continue;
            }
            let Some(chunk) = world.get_chunk(position) else {
                continue;
            };
            chunk.get_mut().mark_dirty();
            scheduled.push(position);
            tasks.push(Box::new(ChunkMeshGenerationTask::new(
                context.world.clone(),
                position,
            )));
        }

        (tasks, render_commands)
    }
}

fn horizontal_neighbors(position: Point2<i32>) -> impl Iterator<Item = Point2<i32>> {
    ChunkNeighborhood::HORIZONTAL_SIDES
        .into_iter()
        .filter_map(move |side| World::neighbor_position(position, side))
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, sync::Arc};

    use super::*;
    use crate::engine_state::voxels::height_field::HeightField;

    fn context(capacity: usize) -> TaskContext {
        TaskContext {
            world: MtResource::new(World::new(
                Arc::new(HeightField::default()),
                NonZeroUsize::new(capacity).unwrap(),
            )),
        }
    }

    #[test]
    fn generates_and_schedules_meshing_for_loaded_neighbors() {
        let context = context(8);
        context.world.get_mut().insert_chunk(Chunk::new(1, 0));
        context.world.get_mut().insert_chunk(Chunk::new(5, 5));

        let task = ChunkGenerationTask::new(context.world.clone(), Point2::new(0, 0));
        let (tasks, commands) = task.process().handle_result(&context);

        assert!(commands.is_empty());
        assert_eq!(tasks.len(), 2);
        let world = context.world.get();
        assert_eq!(world.chunk_count(), 3);
        assert!(world.get_chunk(Point2::new(0, 0)).unwrap().get().is_dirty());
        assert!(world.get_chunk(Point2::new(1, 0)).unwrap().get().is_dirty());
        assert!(!world.get_chunk(Point2::new(5, 5)).unwrap().get().is_dirty());
    }

    #[test]
    fn existing_chunk_is_left_alone() {
        let context = context(8);
        let mut existing = Chunk::new(0, 0);
        existing.set_block(0, 63, 0, existing.get_block(0, 0, 0));
        existing.update();
        context.world.get_mut().insert_chunk(existing);

        let task = ChunkGenerationTask::new(context.world.clone(), Point2::new(0, 0));
        let (tasks, commands) = task.process().handle_result(&context);
        assert!(tasks.is_empty());
        assert!(commands.is_empty());

        let chunk = context.world.get().get_chunk(Point2::new(0, 0)).unwrap();
        assert!(chunk.get().get_block(0, 63, 0).is_solid());
    }

    #[test]
    fn eviction_remeshes_the_neighbors_left_behind() {
        use crate::engine_state::voxels::{block::block_type::BlockType, chunk::CHUNK_WIDTH};

        let context = context(2);
        let mut east = Chunk::empty(1, 0);
        east.set_block(0, 0, 0, BlockType::STONE);
        context.world.get_mut().insert_chunk(east);
        let mut west = Chunk::empty(0, 0);
        west.set_block(CHUNK_WIDTH - 1, 0, 0, BlockType::STONE);
        context.world.get_mut().insert_chunk(west);

        let west = context.world.get().get_chunk(Point2::new(0, 0)).unwrap();
        let neighborhood = context.world.get().neighborhood(Point2::new(0, 0));
        assert!(west.get_mut().update_with_neighbors(&neighborhood));
        assert_eq!(west.get().mesh().face_count(), 5);

        let task = ChunkGenerationTask::new(context.world.clone(), Point2::new(9, 9));
        let (follow_ups, commands) = task.process().handle_result(&context);
        assert_eq!(
            commands,
            vec![RenderCommand::Remove {
                position: Point2::new(1, 0)
            }]
        );
        assert!(!context.world.get().contains_chunk(Point2::new(1, 0)));
        assert!(west.get().is_dirty());
        assert_eq!(follow_ups.len(), 2);

        for follow_up in follow_ups {
            follow_up.process().handle_result(&context);
        }
        assert!(!west.get().is_dirty());
        assert_eq!(west.get().mesh().face_count(), 6);
    }

    #[test]
    fn eviction_becomes_a_remove_command() {
        let context = context(1);
        context.world.get_mut().insert_chunk(Chunk::empty(7, 7));

        let task = ChunkGenerationTask::new(context.world.clone(), Point2::new(0, 0));
        let (_, commands) = task.process().handle_result(&context);

        assert_eq!(
            commands,
            vec![RenderCommand::Remove {
                position: Point2::new(7, 7)
            }]
        );
    }
}
