//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which executes chunk generation and meshing across worker threads.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owning thread
//! 5. The result can spawn new tasks or issue render commands

use crate::{
    core::MtResource,
    engine_state::{rendering::render_target::RenderCommand, voxels::world::World},
};

/// Shared state handed to every task result on the owning thread.
#[derive(Clone)]
pub struct TaskContext {
    /// The world tasks generate into and mesh from.
    pub world: MtResource<World>,
}

/// A unit of work that runs on a worker thread.
///
/// Tasks own everything they need; shared state is reached through
/// [`MtResource`] handles so that locks are only held while working.
pub trait Task: Send {
    /// Performs the work and returns a result to be handled on the owning thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a [`Task`], handled on the owning thread.
pub trait TaskResult: Send {
    /// Consumes the result.
    ///
    /// # Returns
    /// Follow-up tasks to publish, and commands for the render target.
    fn handle_result(
        self: Box<Self>,
        context: &TaskContext,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>);
}
