//! # Engine State Module
//!
//! The façade that ties the voxel world, the worker pool and the render handoff together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `rendering` - Meshing and the render handoff
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Frame Loop
//!
//! The owning thread calls [`EngineState::tick`] once per frame. Each tick:
//! 1. Publishes mesh rebuilds for chunks dirtied by block edits since the last tick
//! 2. Handles finished generation and meshing results, submitting render commands
//! 3. Hands queued tasks to idle workers
//!
//! Edits are batched: any number of `set_block` calls between two ticks cost one
//! rebuild per affected chunk.

use std::{collections::HashSet, num::NonZeroUsize, sync::Arc, thread, time::Duration};

use cgmath::Point2;
use log::{debug, error, info};

use crate::{
    config::EngineConfig,
    core::MtResource,
    error::ConfigError,
};

use rendering::{
    render_target::RenderTarget, tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::block_type::BlockType, height_field::HeightField,
    tasks::chunk_generation_task::ChunkGenerationTask, world::World,
};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the chunk engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_terrain::{config::EngineConfig, engine_state::EngineState};
/// use voxel_terrain::engine_state::rendering::render_target::DrawList;
///
/// let mut engine = EngineState::new(EngineConfig::default()).unwrap();
/// let mut draw_list = DrawList::new();
///
/// engine.update_viewer(0, 0);
/// engine.run_until_idle(&mut draw_list);
/// assert!(!draw_list.draw_calls().is_empty());
/// ```
pub struct EngineState {
    config: EngineConfig,
    world: MtResource<World>,
    task_manager: TaskManager,
    /// Chunks with a generation task published but not yet seen in the world.
    requested: HashSet<Point2<i32>>,
    /// Chunks dirtied by edits since the last tick, in first-edit order.
    pending_remesh: Vec<Point2<i32>>,
    viewer_chunk: Option<Point2<i32>>,
}

impl EngineState {
    /// Validates `config` and starts the engine with an empty world.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let capacity = NonZeroUsize::new(config.world.max_loaded_chunks).ok_or_else(|| {
            ConfigError::Invalid("world.max_loaded_chunks must be at least 1".to_string())
        })?;
        let height_field = Arc::new(HeightField::new(&config.terrain));
        let world = MtResource::new(World::new(height_field, capacity));

        let task_manager = TaskManager::new(
            config.world.resolved_worker_threads(),
            TaskContext {
                world: world.clone(),
            },
        );

        Ok(EngineState {
            config,
            world,
            task_manager,
            requested: HashSet::new(),
            pending_remesh: Vec::new(),
            viewer_chunk: None,
        })
    }

    /// The configuration the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The world shared with the worker pool.
    pub fn world(&self) -> &MtResource<World> {
        &self.world
    }

    /// Publishes generation for every chunk within `radius` of `center` that is
    /// neither loaded nor already requested.
    ///
    /// # Returns
    /// The number of generation tasks published.
    pub fn request_area(&mut self, center: Point2<i32>, radius: u32) -> usize {
        let missing: Vec<_> = {
            let world = self.world.get();
            World::chunks_in_radius(center, radius)
                .into_iter()
                .filter(|position| !world.contains_chunk(*position))
                .filter(|position| !self.requested.contains(position))
                .collect()
        };

        for position in &missing {
            self.requested.insert(*position);
            self.task_manager
                .publish_task(Box::new(ChunkGenerationTask::new(self.world.clone(), *position)));
        }

        if !missing.is_empty() {
            debug!(
                "Requested {} chunks around ({}, {})",
                missing.len(),
                center.x,
                center.y
            );
        }
        missing.len()
    }

    /// Moves the viewer to a world column, streaming in the configured radius
    /// when the viewer enters a new chunk.
    ///
    /// # Returns
    /// The number of generation tasks published.
    pub fn update_viewer(&mut self, world_x: i32, world_z: i32) -> usize {
        let chunk = World::chunk_position_for(world_x, world_z);
        if self.viewer_chunk == Some(chunk) {
            return 0;
        }
        self.viewer_chunk = Some(chunk);
        self.request_area(chunk, self.config.world.view_radius)
    }

    /// Reads a block at world coordinates, if its chunk is loaded.
    pub fn get_block(&self, world_x: i32, y: i32, world_z: i32) -> Option<BlockType> {
        self.world.get().get_block_world(world_x, y, world_z)
    }

    /// Writes a block at world coordinates and queues the affected chunks for remeshing.
    ///
    /// # Returns
    /// `false` if the write was dropped because the chunk is not loaded or `y` is out of range.
    pub fn set_block(&mut self, world_x: i32, y: i32, world_z: i32, block: BlockType) -> bool {
        let dirtied = self.world.get().set_block_world(world_x, y, world_z, block);
        let written = !dirtied.is_empty();
        for position in dirtied {
            if !self.pending_remesh.contains(&position) {
                self.pending_remesh.push(position);
            }
        }
        written
    }

    /// Advances background work by one step.
    ///
    /// # Returns
    /// The number of task results handled.
    pub fn tick(&mut self, target: &mut dyn RenderTarget) -> usize {
        for position in self.pending_remesh.drain(..) {
            self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                self.world.clone(),
                position,
            )));
        }

        let handled = self.task_manager.process_completed_tasks(target);
        self.task_manager.process_queued_tasks();

        if self.task_manager.is_idle() {
            self.requested.clear();
        } else if !self.requested.is_empty() {
            let world = self.world.get();
            self.requested.retain(|position| !world.contains_chunk(*position));
        }

        handled
    }

    /// Whether there is no background work left.
    pub fn is_idle(&self) -> bool {
        self.pending_remesh.is_empty() && self.task_manager.is_idle()
    }

    /// Ticks until all background work has finished, or until no worker thread is
    /// left to do it.
    pub fn run_until_idle(&mut self, target: &mut dyn RenderTarget) {
        let mut handled = 0;
        loop {
            handled += self.tick(target);
            if self.is_idle() {
                break;
            }
            if self.task_manager.worker_count() == 0 {
                error!(
                    "No chunk workers left, abandoning {} queued tasks",
                    self.task_manager.queued_count()
                );
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        info!(
            "Background work settled after {} results; {} chunks loaded",
            handled,
            self.world.get().chunk_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::WorldConfig, engine_state::rendering::render_target::DrawList};

    fn engine(view_radius: u32, max_loaded_chunks: usize) -> EngineState {
        EngineState::new(EngineConfig {
            world: WorldConfig {
                view_radius,
                max_loaded_chunks,
                worker_threads: 2,
            },
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.terrain.octaves = 0;
        assert!(EngineState::new(config).is_err());
    }

    #[test]
    fn streaming_uploads_every_chunk_in_view() {
        let mut engine = engine(1, 64);
        let mut draw_list = DrawList::new();

        assert_eq!(engine.update_viewer(5, 5), 9);
        assert_eq!(engine.update_viewer(6, 6), 0);
        engine.run_until_idle(&mut draw_list);

        assert_eq!(engine.world().get().chunk_count(), 9);
        assert_eq!(draw_list.draw_calls().len(), 9);
        for position in World::chunks_in_radius(Point2::new(0, 0), 1) {
            let chunk = engine.world().get().get_chunk(position).unwrap();
            let chunk = chunk.get();
            assert!(!chunk.is_dirty());
            assert_eq!(
                draw_list.mesh(position).unwrap().vertex_count,
                chunk.mesh().vertex_count()
            );
        }
    }

    #[test]
    fn edits_are_remeshed_on_tick() {
        let mut engine = engine(0, 16);
        let mut draw_list = DrawList::new();
        engine.update_viewer(0, 0);
        engine.run_until_idle(&mut draw_list);

        assert!(engine.set_block(3, 63, 3, BlockType::STONE));
        assert!(engine.set_block(4, 63, 3, BlockType::STONE));
        assert!(!engine.is_idle());
        assert!(!engine.set_block(100, 10, 100, BlockType::STONE));
        engine.run_until_idle(&mut draw_list);

        assert_eq!(engine.get_block(3, 63, 3), Some(BlockType::STONE));
        let chunk = engine.world().get().get_chunk(Point2::new(0, 0)).unwrap();
        assert!(!chunk.get().is_dirty());
        assert_eq!(
            draw_list.mesh(Point2::new(0, 0)).unwrap().vertex_count,
            chunk.get().mesh().vertex_count()
        );
    }

    #[test]
    fn moving_past_capacity_removes_old_chunks() {
        let mut engine = engine(0, 2);
        let mut draw_list = DrawList::new();
        for x in 0..4 {
            engine.update_viewer(x * 16, 0);
            engine.run_until_idle(&mut draw_list);
        }
        assert_eq!(engine.world().get().chunk_count(), 2);
        assert_eq!(draw_list.len(), 2);
        assert!(draw_list.mesh(Point2::new(3, 0)).is_some());
        assert!(draw_list.mesh(Point2::new(0, 0)).is_none());
    }
}
