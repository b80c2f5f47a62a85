//! Background tasks for the rendering side of the engine.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Rebuilds a dirty chunk's mesh on a worker thread

pub mod chunk_mesh_generation_task;
