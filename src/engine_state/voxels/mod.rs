//! # Voxel Engine Core
//!
//! Voxel data: blocks, chunks, terrain generation and the world that holds them.
//!
//! ## Architecture
//!
//! * **Block**: Block types and the per-face geometry tables
//! * **Height field**: Noise-driven terrain heights
//! * **Chunk**: A fixed-size grid of blocks with a lazily rebuilt mesh
//! * **World**: The bounded set of loaded chunks and world-space block access
//! * **Tasks**: Chunk generation on the worker pool
//!
//! ## Data Flow
//!
//! 1. A generation task fills a chunk from the height field and inserts it into the world
//! 2. The chunk and its loaded neighbors are marked dirty and queued for meshing
//! 3. Block edits go through the world, dirtying the owning chunk and any neighbor sharing the edge
//! 4. Meshing tasks rebuild dirty chunks and hand the buffers to the renderer

pub mod block;
pub mod chunk;
pub mod height_field;
pub mod tasks;
pub mod world;
